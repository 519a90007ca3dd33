use super::{Error, Result};
use crate::cgroup::CgroupEntry;
use crate::fsutil::{self, Probe};
use crate::namespace;
use std::path::Path;
use std::{env, fs};

/// Fails on anything but Linux.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] when not compiled for Linux.
pub fn ensure_linux() -> Result<()> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform(env::consts::OS))
    }
}

/// Fails unless the probe roots look like a Linux procfs and cgroup filesystem.
///
/// # Errors
///
/// - [`Error::UnsupportedPlatform`] when not compiled for Linux.
/// - [`Error::MissingProcfs`] if `<proc>/self` does not exist.
/// - [`Error::MissingCgroupRoot`] if the cgroup root is not a directory.
pub fn ensure_supported(probe: &Probe) -> Result<()> {
    ensure_linux()?;

    let self_dir = probe.proc_root().join("self");
    if !self_dir.exists() {
        return Err(Error::MissingProcfs {
            path: probe.proc_root().to_path_buf(),
        });
    }

    if !probe.cgroup_root().is_dir() {
        return Err(Error::MissingCgroupRoot {
            path: probe.cgroup_root().to_path_buf(),
        });
    }

    Ok(())
}

/// Returns true if the given rootfs path contains a mounted `/proc`.
///
/// # Errors
///
/// Returns [`Error::ExistenceCheck`] if checking the existence of the `/proc` directory fails.
pub fn contains_proc_mount(rootfs: impl AsRef<Path>) -> Result<bool> {
    let path = rootfs.as_ref().join("proc");

    path.try_exists()
        .map_err(|source| Error::ExistenceCheck { path, source })
}

/// Returns true if the init process of `rootfs` lives in a different PID namespace than we do.
///
/// # Errors
///
/// Returns [`Error::Fs`] if either namespace link cannot be read and
/// [`Error::Namespace`] if a link target is malformed.
pub fn is_pid_namespace_isolated(rootfs: impl AsRef<Path>) -> Result<bool> {
    let self_ns_path = Path::new("/proc/self/ns/pid");
    let self_ns = fsutil::read_link(self_ns_path)?;
    let self_ns = namespace::parse_link_target(&self_ns.to_string_lossy(), self_ns_path)?;

    let root_ns_path = rootfs.as_ref().join("proc/1/ns/pid");
    let root_ns = fsutil::read_link(&root_ns_path)?;
    let root_ns = namespace::parse_link_target(&root_ns.to_string_lossy(), &root_ns_path)?;

    Ok(self_ns != root_ns)
}

/// Returns true if our own cgroup membership suggests a containerized environment.
///
/// # Errors
///
/// Returns [`Error::Fs`] if `/proc/self/cgroup` cannot be read.
pub fn matches_container_cgroup() -> Result<bool> {
    let raw = fsutil::read_file("/proc/self/cgroup")?;
    Ok(cgroup_text_looks_containerized(&String::from_utf8_lossy(
        &raw,
    )))
}

fn cgroup_text_looks_containerized(raw: &str) -> bool {
    CgroupEntry::parse_all(raw).any(|entry| {
        let path = entry.path;
        path.contains("docker")
            || path.contains("kubepods")
            || path.contains("containerd")
            || path.contains("libpod")
            || path
                .split('/')
                .any(|part| part.len() >= 32 && is_non_empty_hex_string(part))
    })
}

/// Returns true if environment markers (files or variables) suggest a containerized environment.
pub fn has_container_indicators() -> bool {
    fs::metadata("/.dockerenv").is_ok()
        || fs::metadata("/run/.containerenv").is_ok()
        || env::var("container").is_ok()
}

/// Returns true if the input string is not empty and contains only ASCII hex digits.
pub fn is_non_empty_hex_string(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    s.chars().all(|c| c.is_ascii_hexdigit())
}
