use crate::{environment, fsutil, namespace};

/// Errors that abort a gather pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Environment(#[from] environment::Error),
    #[error("failed to enumerate processes: {0}")]
    Enumerate(#[source] fsutil::FsError),
    #[error(transparent)]
    Namespace(#[from] namespace::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
