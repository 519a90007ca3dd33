//! Crate-level error type and helpers for best-effort results.
use crate::{cgroup, environment, index, monitor, namespace, query};

/// Errors surfaced to the caller of the library's entry points.
///
/// Per-item read failures never show up here; they are omitted where they
/// happen. What remains is a broken environment or malformed caller input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Environment(#[from] environment::Error),
    #[error(transparent)]
    Gather(#[from] index::Error),
    #[error(transparent)]
    Cgroup(#[from] cgroup::Error),
    #[error(transparent)]
    Namespace(#[from] namespace::Error),
    #[error(transparent)]
    Query(#[from] query::Error),
    #[error(transparent)]
    Monitor(#[from] monitor::Error),
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
    #[error("failed to register signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

impl Error {
    /// Whether the error stems from caller input rather than the host.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Query(query::Error::MalformedSpec { .. })
                | Error::Monitor(monitor::Error::MalformedSpec { .. })
                | Error::Namespace(namespace::Error::InvalidId(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    /// Turns the result into an option, logging the error at `level`.
    fn ok_log(self, level: log::Level) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, level: log::Level) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{err}");
                None
            }
        }
    }
}
