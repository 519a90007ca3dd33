use std::collections::BTreeMap;
use std::path::Path;

use crate::fsutil::{self, Probe};
use crate::index::Index;
use crate::process::Process;

use super::{CgroupEntry, Error, HierarchyId, Result};

/// Live control-file values of one cgroup, keyed by file name.
///
/// Computed fresh on every call; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct CgroupUsage {
    files: BTreeMap<String, String>,
}

impl CgroupUsage {
    /// Raw value of a control file, including any trailing newline.
    pub fn get(&self, control_file: &str) -> Option<&str> {
        self.files.get(control_file).map(String::as_str)
    }

    /// Value folded onto a single line: newlines become spaces, trailing whitespace is dropped.
    pub fn single_line(&self, control_file: &str) -> Option<String> {
        self.get(control_file)
            .map(|v| v.trim_end().replace('\n', " "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Reads the control files of the cgroup `pid` belongs to in `hierarchy`.
///
/// The pid's cgroup membership comes from its indexed snapshot.
///
/// # Errors
///
/// - [`Error::UnknownPid`] if `pid` is not in the index.
/// - [`Error::NoMatchingHierarchy`] if no membership line has that hierarchy id.
/// - [`Error::Fs`] if the cgroup directory cannot be listed.
pub fn usage(probe: &Probe, index: &Index, pid: u32, hierarchy: HierarchyId) -> Result<CgroupUsage> {
    let process = index.process(pid).ok_or(Error::UnknownPid(pid))?;
    usage_for_process(probe, process, hierarchy)
}

/// Like [`usage`], for an already known process record.
///
/// # Errors
///
/// See [`usage`].
pub fn usage_for_process(
    probe: &Probe,
    process: &Process,
    hierarchy: HierarchyId,
) -> Result<CgroupUsage> {
    let no_match = || Error::NoMatchingHierarchy {
        pid: process.pid,
        hierarchy,
    };
    let raw = process.cgroups.present().ok_or_else(no_match)?;
    let entry = CgroupEntry::find(raw, hierarchy).ok_or_else(no_match)?;

    let dir = entry.directory(probe.cgroup_root());
    log::debug!("reading control files of pid {} from `{}`", process.pid, dir.display());
    read_control_files(&dir)
}

/// Reads every non-directory entry of `dir`; files that cannot be read are skipped.
///
/// # Errors
///
/// Returns [`Error::Fs`] if `dir` cannot be listed.
pub fn read_control_files(dir: &Path) -> Result<CgroupUsage> {
    let mut files = BTreeMap::new();
    for name in fsutil::list_files(dir)? {
        match fsutil::read_file(dir.join(&name)) {
            Ok(raw) => {
                files.insert(name, String::from_utf8_lossy(&raw).into_owned());
            }
            Err(err) => log::trace!("skipping control file: {err}"),
        }
    }
    Ok(CgroupUsage { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsutil::Probed;
    use crate::process::Status;

    fn process_in(cgroups: &str) -> Process {
        Process::from_parts(
            Status {
                pid: 300,
                ppid: 1,
                name: "worker".into(),
                state: "R (running)".into(),
                threads: 4,
                uids: "0\t0\t0\t0".into(),
            },
            Probed::Present(cgroups.into()),
            Probed::Present("worker".into()),
        )
    }

    #[test]
    fn test_usage_reads_matching_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cpu/user.slice");
        std::fs::create_dir_all(dir.join("child.scope")).unwrap();
        std::fs::write(dir.join("cpu.shares"), "1024\n").unwrap();
        std::fs::write(dir.join("cpu.stat"), "nr_periods 0\nnr_throttled 0\n").unwrap();
        let probe = Probe::new(tmp.path().join("proc"), tmp.path());

        let usage = usage_for_process(&probe, &process_in("1:cpu:/user.slice\n"), HierarchyId::new(1))
            .unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage.get("cpu.shares"), Some("1024\n"));
        assert_eq!(
            usage.single_line("cpu.stat").as_deref(),
            Some("nr_periods 0 nr_throttled 0")
        );
    }

    #[test]
    fn test_usage_absent_hierarchy_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = Probe::new(tmp.path(), tmp.path());
        let err = usage_for_process(&probe, &process_in("1:cpu:/user.slice\n"), HierarchyId::new(99))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NoMatchingHierarchy { pid: 300, hierarchy } if hierarchy == HierarchyId::new(99)
        ));
    }

    #[test]
    fn test_usage_unknown_pid() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = Probe::new(tmp.path(), tmp.path());
        let index = Index::default();
        assert!(matches!(
            usage(&probe, &index, 1, HierarchyId::new(1)),
            Err(Error::UnknownPid(1))
        ));
    }

    #[test]
    fn test_unreadable_control_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("memory.usage_in_bytes"), "4096\n").unwrap();
        // Listed, but opening it fails.
        std::os::unix::fs::symlink(
            tmp.path().join("missing"),
            tmp.path().join("memory.force_empty"),
        )
        .unwrap();

        let usage = read_control_files(tmp.path()).unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage.get("memory.usage_in_bytes"), Some("4096\n"));
    }
}
