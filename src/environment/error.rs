use std::path::PathBuf;

use crate::{fsutil, namespace};

/// Errors that may occur during environment detection and validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to check if path `{path}` exists: {source}")]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
    #[error(transparent)]
    Namespace(#[from] namespace::Error),
    #[error("unsupported platform `{0}`: namespace introspection requires Linux")]
    UnsupportedPlatform(&'static str),
    #[error("procfs not found at `{path}`")]
    MissingProcfs { path: PathBuf },
    #[error("cgroup filesystem not found at `{path}`")]
    MissingCgroupRoot { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
