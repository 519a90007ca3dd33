use std::path::PathBuf;

use crate::fsutil;

use super::HierarchyId;

/// Errors that may occur while resolving cgroup data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid hierarchy id `{0}`: expected a decimal number")]
    InvalidHierarchyId(String),
    #[error("pid {0} is not indexed")]
    UnknownPid(u32),
    #[error("pid {pid} has no cgroup membership for hierarchy {hierarchy}")]
    NoMatchingHierarchy { pid: u32, hierarchy: HierarchyId },
}

pub type Result<T> = std::result::Result<T, Error>;
