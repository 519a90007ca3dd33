use std::num::ParseIntError;
use std::path::PathBuf;

/// Errors that may occur while snapshotting a process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read line {line} of `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for '{key}' at line {line} of `{path}`: '{value}': {source}")]
    InvalidKeyValue {
        path: PathBuf,
        key: &'static str,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
