use crate::process;

/// Errors that prevent a monitor from starting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed monitor spec `{spec}`: {reason}")]
    MalformedSpec { spec: String, reason: &'static str },
    #[error("process {0} is not running or its status is unreadable")]
    ProcessUnavailable(u32),
    #[error(transparent)]
    Process(#[from] process::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
