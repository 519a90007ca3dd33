//! Filesystem probe for the procfs and cgroup pseudo-filesystems.
//!
//! Everything the crate learns about the host goes through [`Probe`], which
//! only knows two roots: the procfs mount (usually `/proc`) and the cgroup
//! filesystem root (usually `/sys/fs/cgroup`). Keeping the roots explicit lets
//! the whole gathering pipeline run against a synthetic tree in tests.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Open,
    Read,
    ReadLink,
    ListDir,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            FsOp::Open => "open file",
            FsOp::Read => "read file",
            FsOp::ReadLink => "read symlink",
            FsOp::ListDir => "list directory",
        };
        f.write_str(op)
    }
}

/// Error that occurs when a probe operation fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to {op} `{path}`: {source}")]
pub struct FsError {
    pub op: FsOp,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FsError {
    fn new(op: FsOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Outcome of a best-effort read.
///
/// Missing data is never an error on its own; callers decide whether to omit
/// the item, but can still tell *why* it is missing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Probed<T> {
    /// The value was read.
    Present(T),
    /// The read failed for a reason that may not repeat (pid exited, permission denied).
    Transient(#[serde(serialize_with = "serialize_error_kind")] io::ErrorKind),
    /// The file does not exist for a live process, i.e. the kernel does not expose it.
    Unsupported,
}

impl<T> Probed<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Probed::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_present(self) -> Option<T> {
        match self {
            Probed::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Probed::Present(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probed<U> {
        match self {
            Probed::Present(v) => Probed::Present(f(v)),
            Probed::Transient(kind) => Probed::Transient(kind),
            Probed::Unsupported => Probed::Unsupported,
        }
    }
}

fn serialize_error_kind<S>(kind: &io::ErrorKind, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(kind)
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns an [`FsError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use container_info::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/status")?;
/// # Ok::<(), fsutil::FsError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FsError::new(FsOp::Open, path, source))?;
    Ok(BufReader::new(file))
}

/// Reads the whole file into memory.
///
/// # Errors
///
/// Returns an [`FsError`] if the file cannot be opened or read.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
    let path = path.as_ref();
    let mut reader = open_file_reader(path)?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|source| FsError::new(FsOp::Read, path, source))?;
    Ok(buf)
}

/// Reads the target of a symbolic link.
///
/// # Errors
///
/// Returns an [`FsError`] if the link cannot be read.
pub fn read_link(path: impl AsRef<Path>) -> Result<OsString, FsError> {
    let path = path.as_ref();
    std::fs::read_link(path)
        .map(PathBuf::into_os_string)
        .map_err(|source| FsError::new(FsOp::ReadLink, path, source))
}

/// Lists the names of the non-directory entries directly inside `dir`, sorted.
///
/// Subdirectories and entries whose type cannot be determined are skipped.
///
/// # Errors
///
/// Returns an [`FsError`] if the directory itself cannot be listed.
pub fn list_files(dir: impl AsRef<Path>) -> Result<Vec<String>, FsError> {
    let dir = dir.as_ref();
    let entries =
        std::fs::read_dir(dir).map_err(|source| FsError::new(FsOp::ListDir, dir, source))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|ft| !ft.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort_unstable();
    Ok(names)
}

/// Read-only view of the host's procfs and cgroup filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    proc_root: PathBuf,
    cgroup_root: PathBuf,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new("/proc", "/sys/fs/cgroup")
    }
}

impl Probe {
    pub fn new(proc_root: impl Into<PathBuf>, cgroup_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            cgroup_root: cgroup_root.into(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn cgroup_root(&self) -> &Path {
        &self.cgroup_root
    }

    /// `<proc>/<pid>`
    pub fn pid_dir(&self, pid: u32) -> PathBuf {
        self.proc_root.join(pid.to_string())
    }

    /// Returns whether `<proc>/<pid>` still exists.
    pub fn pid_alive(&self, pid: u32) -> bool {
        self.pid_dir(pid).is_dir()
    }

    /// Lists every purely numeric entry of the procfs root, ascending.
    ///
    /// # Errors
    ///
    /// Returns an [`FsError`] if the procfs root cannot be listed.
    pub fn pids(&self) -> Result<Vec<u32>, FsError> {
        let entries = std::fs::read_dir(&self.proc_root)
            .map_err(|source| FsError::new(FsOp::ListDir, &self.proc_root, source))?;

        let mut pids: Vec<u32> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_str()?;
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                name.parse().ok()
            })
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    /// Reads the symlink `<proc>/<pid>/ns/<name>`.
    pub fn ns_link(&self, pid: u32, name: &str) -> Result<OsString, FsError> {
        read_link(self.pid_dir(pid).join("ns").join(name))
    }

    /// Opens `<proc>/<pid>/<file>` for line-wise reading.
    pub fn open_pid_file(&self, pid: u32, file: &str) -> Result<BufReader<File>, FsError> {
        open_file_reader(self.pid_dir(pid).join(file))
    }

    /// Reads `<proc>/<pid>/<file>`, classifying a failure as transient or unsupported.
    pub fn read_pid_file(&self, pid: u32, file: &str) -> Probed<Vec<u8>> {
        match read_file(self.pid_dir(pid).join(file)) {
            Ok(buf) => Probed::Present(buf),
            Err(err) => {
                log::trace!("{err}");
                self.classify(pid, &err)
            }
        }
    }

    /// Opens `<proc>/cgroups`.
    pub fn open_available_cgroups(&self) -> Result<BufReader<File>, FsError> {
        open_file_reader(self.proc_root.join("cgroups"))
    }

    /// Maps a failed per-pid read to [`Probed`]: a missing file under a live pid
    /// directory means the kernel does not provide it.
    pub fn classify<T>(&self, pid: u32, err: &FsError) -> Probed<T> {
        if err.kind() == io::ErrorKind::NotFound && self.pid_alive(pid) {
            Probed::Unsupported
        } else {
            Probed::Transient(err.kind())
        }
    }
}
