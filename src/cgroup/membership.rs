//! Parsing of `/proc/<pid>/cgroup`.
//!
//! Each line reads `<hierarchy-id>:<controller-list>:<cgroup-path>`:
//!
//! - v1: arbitrary hierarchy number, comma-separated controllers (or
//!   `name=<x>` for named hierarchies), path relative to that hierarchy's mount.
//! - v2: hierarchy `0`, empty controller list, path relative to the unified mount.

use std::path::{Path, PathBuf};

use super::HierarchyId;

const HYBRID_UNIFIED_DIR: &str = "unified";

/// One membership line of `/proc/<pid>/cgroup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgroupEntry<'a> {
    pub hierarchy: HierarchyId,
    pub controllers: &'a str,
    pub path: &'a str,
}

impl<'a> CgroupEntry<'a> {
    /// Parses a single line; returns `None` if it does not have three fields
    /// or the hierarchy is not numeric.
    ///
    /// # Examples
    ///
    /// ```
    /// # use container_info::cgroup::{CgroupEntry, HierarchyId};
    /// let entry = CgroupEntry::parse("4:cpu,cpuacct:/user.slice").unwrap();
    /// assert_eq!(entry.hierarchy, HierarchyId::new(4));
    /// assert_eq!(entry.controllers, "cpu,cpuacct");
    /// assert_eq!(entry.path, "/user.slice");
    /// ```
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut parts = line.trim_end_matches(['\n', '\r']).splitn(3, ':');
        let hierarchy = parts.next()?.parse().ok()?;
        let controllers = parts.next()?;
        let path = parts.next()?;
        Some(Self {
            hierarchy,
            controllers,
            path,
        })
    }

    /// Parses every well-formed line of a raw cgroup file.
    pub fn parse_all(raw: &'a str) -> impl Iterator<Item = CgroupEntry<'a>> {
        raw.lines().filter_map(|line| {
            let entry = Self::parse(line);
            if entry.is_none() && !line.trim().is_empty() {
                log::trace!("ignoring malformed cgroup line `{line}`");
            }
            entry
        })
    }

    /// Finds the line for `hierarchy` in a raw cgroup file.
    pub fn find(raw: &'a str, hierarchy: HierarchyId) -> Option<Self> {
        Self::parse_all(raw).find(|entry| entry.hierarchy == hierarchy)
    }

    /// Sub-directory of the cgroup root this hierarchy is mounted at.
    ///
    /// Empty for the unified hierarchy, `systemd` for `name=systemd`, and the
    /// controller list verbatim otherwise (e.g. `cpu,cpuacct`).
    pub fn mount_dir(&self) -> &'a str {
        self.controllers
            .strip_prefix("name=")
            .unwrap_or(self.controllers)
    }

    /// Directory holding this cgroup's control files under `root`.
    ///
    /// On hybrid hosts the v2 hierarchy sits at `<root>/unified` next to the
    /// v1 controller mounts; that sub-directory is used when it exists.
    pub fn directory(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        let mount = self.mount_dir();
        if !mount.is_empty() {
            dir.push(mount);
        } else if self.hierarchy == HierarchyId::UNIFIED && root.join(HYBRID_UNIFIED_DIR).is_dir() {
            dir.push(HYBRID_UNIFIED_DIR);
        }
        let relative = self.path.trim_start_matches('/');
        if !relative.is_empty() {
            dir.push(relative);
        }
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "12:pids:/user.slice/user-1000.slice\n\
1:name=systemd:/user.slice/user-1000.slice/session-2.scope\n\
4:cpu,cpuacct:/user.slice\n\
0::/user.slice/user-1000.slice/session-2.scope\n";

    #[test]
    fn test_parse_all_lines() {
        let entries: Vec<_> = CgroupEntry::parse_all(RAW).collect();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[3].hierarchy, HierarchyId::UNIFIED);
        assert_eq!(entries[3].controllers, "");
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let entries: Vec<_> = CgroupEntry::parse_all("garbage\nx:cpu:/\n3:memory:/a\n").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].controllers, "memory");
    }

    #[test]
    fn test_path_may_contain_colons() {
        let entry = CgroupEntry::parse("5:devices:/docker/abc:def").unwrap();
        assert_eq!(entry.path, "/docker/abc:def");
    }

    #[test]
    fn test_find_by_hierarchy() {
        let entry = CgroupEntry::find(RAW, HierarchyId::new(4)).unwrap();
        assert_eq!(entry.path, "/user.slice");
        assert!(CgroupEntry::find(RAW, HierarchyId::new(99)).is_none());
    }

    #[test]
    fn test_directory_layouts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let v1 = CgroupEntry::parse("1:cpu:/user.slice").unwrap();
        assert_eq!(v1.directory(root), root.join("cpu/user.slice"));

        let named = CgroupEntry::parse("1:name=systemd:/init.scope").unwrap();
        assert_eq!(named.directory(root), root.join("systemd/init.scope"));

        let unified = CgroupEntry::parse("0::/").unwrap();
        assert_eq!(unified.directory(root), root);
        let scoped = CgroupEntry::parse("0::/system.slice/cron.service").unwrap();
        assert_eq!(scoped.directory(root), root.join("system.slice/cron.service"));
    }

    #[test]
    fn test_hybrid_host_uses_unified_mount() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("unified/system.slice")).unwrap();
        std::fs::create_dir_all(root.join("memory")).unwrap();

        let v2 = CgroupEntry::parse("0::/system.slice").unwrap();
        assert_eq!(v2.directory(root), root.join("unified/system.slice"));

        let v1 = CgroupEntry::parse("3:memory:/system.slice").unwrap();
        assert_eq!(v1.directory(root), root.join("memory/system.slice"));
    }
}
