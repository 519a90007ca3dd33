use std::path::PathBuf;

/// Errors that may occur while resolving namespaces.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed namespace link target `{target}` at `{path}`")]
    MalformedLink { path: PathBuf, target: String },
    #[error("unknown namespace type `{0}`")]
    UnknownType(String),
    #[error("invalid namespace id `{0}`: expected a decimal inode number")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
