use crate::cgroup;

/// Errors returned by index queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed cgroup spec `{spec}`: expected PID:HIERARCHY, both decimal")]
    MalformedSpec { spec: String },
    #[error(transparent)]
    Cgroup(#[from] cgroup::Error),
}

impl Error {
    /// Whether the query was well-formed but matched nothing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Cgroup(
                cgroup::Error::UnknownPid(_) | cgroup::Error::NoMatchingHierarchy { .. },
            ) => true,
            Error::Cgroup(cgroup::Error::Fs(err)) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
