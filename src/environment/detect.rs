use std::path::{Path, PathBuf};

use super::checks::{
    contains_proc_mount, has_container_indicators, is_pid_namespace_isolated,
    matches_container_cgroup,
};

/// Where the tool itself is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Host,
    /// Docker, Kubernetes, Podman and friends; the host is visible under a rootfs mount.
    Container,
}

/// Guesses whether we run inside a container.
///
/// Any one positive heuristic is enough:
///
/// 1. `rootfs` has a `proc` whose pid 1 lives in another PID namespace than ours.
/// 2. `/proc/self/cgroup` names a container runtime or a container id.
/// 3. A runtime marker file or the `container` variable is present.
///
/// A heuristic that fails is logged and treated as negative.
pub fn detect_runtime_environment(rootfs: impl AsRef<Path>) -> RuntimeEnvironment {
    let rootfs = rootfs.as_ref();
    let isolated = contains_proc_mount(rootfs).and_then(|has_proc| {
        if has_proc {
            is_pid_namespace_isolated(rootfs)
        } else {
            Ok(false)
        }
    });
    match isolated {
        Ok(true) => return RuntimeEnvironment::Container,
        Ok(false) => {}
        Err(err) => log::warn!("pid namespace check against `{}` failed: {err}", rootfs.display()),
    }

    match matches_container_cgroup() {
        Ok(true) => return RuntimeEnvironment::Container,
        Ok(false) => {}
        Err(err) => log::warn!("cgroup membership check failed: {err}"),
    }

    if has_container_indicators() {
        RuntimeEnvironment::Container
    } else {
        RuntimeEnvironment::Host
    }
}

/// Picks the root filesystem to inspect: the host mount inside a container, `/` otherwise.
///
/// A container without the host mount still sees its own `/proc`, so it
/// falls back to `/` with a warning.
pub fn select_rootfs(environment: RuntimeEnvironment, host_rootfs: &Path) -> PathBuf {
    match environment {
        RuntimeEnvironment::Host => PathBuf::from("/"),
        RuntimeEnvironment::Container if host_rootfs.exists() => host_rootfs.to_path_buf(),
        RuntimeEnvironment::Container => {
            log::warn!(
                "running inside a container, but the host root is not mounted at `{}`; \
                 only processes visible to the container are listed",
                host_rootfs.display()
            );
            PathBuf::from("/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_rootfs() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            select_rootfs(RuntimeEnvironment::Host, tmp.path()),
            PathBuf::from("/")
        );
        assert_eq!(
            select_rootfs(RuntimeEnvironment::Container, tmp.path()),
            tmp.path()
        );
    }

    #[test]
    fn test_container_without_host_mount_uses_own_root() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            select_rootfs(RuntimeEnvironment::Container, &tmp.path().join("rootfs")),
            PathBuf::from("/")
        );
    }
}
