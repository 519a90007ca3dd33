//! Runtime configuration read from environment variables.
use std::path::{Path, PathBuf};

use crate::fsutil::Probe;

const ROOTFS_MOUNT_PATH: &str = "ROOTFS_MOUNT_PATH";
const PROC_ROOT: &str = "CI_PROC_ROOT";
const CGROUP_ROOT: &str = "CI_CGROUP_ROOT";
const DEBUG: &str = "DEBUG";

const DEFAULT_ROOTFS_MOUNT: &str = "/rootfs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the host root is mounted when running inside a container.
    pub rootfs_mount: PathBuf,
    /// Overrides `<rootfs>/proc`.
    pub proc_root: Option<PathBuf>,
    /// Overrides `<rootfs>/sys/fs/cgroup`.
    pub cgroup_root: Option<PathBuf>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rootfs_mount: PathBuf::from(DEFAULT_ROOTFS_MOUNT),
            proc_root: None,
            cgroup_root: None,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. An unparseable `DEBUG` value is ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let debug = get(DEBUG)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);

        Self {
            rootfs_mount: get(ROOTFS_MOUNT_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOTFS_MOUNT)),
            proc_root: get(PROC_ROOT).map(PathBuf::from),
            cgroup_root: get(CGROUP_ROOT).map(PathBuf::from),
            debug,
        }
    }

    /// Default filter for `env_logger` when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }

    /// Probe rooted at `rootfs`, honouring the explicit overrides.
    pub fn probe(&self, rootfs: &Path) -> Probe {
        let proc_root = self
            .proc_root
            .clone()
            .unwrap_or_else(|| rootfs.join("proc"));
        let cgroup_root = self
            .cgroup_root
            .clone()
            .unwrap_or_else(|| rootfs.join("sys/fs/cgroup"));
        Probe::new(proc_root, cgroup_root)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), Config::default());
        assert_eq!(Config::default().log_filter(), "warn");
    }

    #[test]
    fn test_debug_values() {
        for value in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(config(&[("DEBUG", value)]).debug, "{value}");
        }
        for value in ["0", "f", "false", "FALSE", "yes", ""] {
            assert!(!config(&[("DEBUG", value)]).debug, "{value}");
        }
        assert_eq!(config(&[("DEBUG", "1")]).log_filter(), "debug");
    }

    #[test]
    fn test_probe_roots() {
        let cfg = config(&[("ROOTFS_MOUNT_PATH", "/host")]);
        assert_eq!(cfg.rootfs_mount, PathBuf::from("/host"));
        let probe = cfg.probe(Path::new("/host"));
        assert_eq!(probe.proc_root(), Path::new("/host/proc"));
        assert_eq!(probe.cgroup_root(), Path::new("/host/sys/fs/cgroup"));

        let cfg = config(&[("CI_PROC_ROOT", "/tmp/proc"), ("CI_CGROUP_ROOT", "/tmp/cg")]);
        let probe = cfg.probe(Path::new("/"));
        assert_eq!(probe.proc_root(), Path::new("/tmp/proc"));
        assert_eq!(probe.cgroup_root(), Path::new("/tmp/cg"));
    }
}
