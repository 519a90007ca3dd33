//! Point-in-time process records.
//!
//! A [`Process`] is captured from `/proc/<pid>/status`, `/proc/<pid>/cgroup`
//! and `/proc/<pid>/cmdline`. It is immutable once taken and may already be
//! stale when displayed: the process can exit right after the read.
mod error;
mod snapshot;
mod status;

pub use error::{Error, Result};
pub use snapshot::snapshot;
pub use status::Status;

use crate::cgroup::CgroupEntry;
use crate::fsutil::Probed;

/// Snapshot of one pid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Process {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub state: String,
    #[serde(rename = "nthreads")]
    pub threads: u32,
    /// Raw `Uid:` value from the status file.
    pub uids: String,
    /// Raw contents of `/proc/<pid>/cgroup`.
    pub cgroups: Probed<String>,
    /// Raw NUL-separated argument vector, trimmed.
    #[serde(rename = "cmd")]
    pub command: Probed<String>,
}

impl Process {
    pub fn from_parts(status: Status, cgroups: Probed<String>, command: Probed<String>) -> Self {
        Self {
            pid: status.pid,
            ppid: status.ppid,
            name: status.name,
            state: status.state,
            threads: status.threads,
            uids: status.uids,
            cgroups,
            command,
        }
    }

    /// Effective uid, the second field of the `Uid:` line.
    pub fn effective_uid(&self) -> Option<u32> {
        self.uids.split_whitespace().nth(1)?.parse().ok()
    }

    /// Raw command line, empty if it could not be read.
    pub fn command(&self) -> &str {
        self.command.present().map(String::as_str).unwrap_or_default()
    }

    /// Command line with argument separators replaced by spaces.
    pub fn command_line(&self) -> String {
        self.command().replace('\0', " ")
    }

    /// Parsed cgroup membership lines; malformed lines are dropped.
    pub fn cgroup_entries(&self) -> Vec<CgroupEntry<'_>> {
        match self.cgroups.present() {
            Some(raw) => CgroupEntry::parse_all(raw).collect(),
            None => Vec::new(),
        }
    }
}
