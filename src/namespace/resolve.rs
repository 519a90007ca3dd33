use std::path::Path;

use crate::fsutil::{Probe, Probed};

use super::{Error, Namespace, NamespaceId, NamespaceType, Result};

/// Resolves the namespace of the given type that `pid` belongs to.
///
/// A pid that vanished, a namespace type the kernel does not expose and a
/// permission failure are not errors: they come back as a non-present
/// [`Probed`] and the caller simply leaves the pair out.
///
/// # Errors
///
/// Returns [`Error::MalformedLink`] if the link target does not have the
/// kernel's `<type>:[<inode>]` shape.
pub fn resolve(probe: &Probe, kind: NamespaceType, pid: u32) -> Result<Probed<Namespace>> {
    let target = match probe.ns_link(pid, kind.as_str()) {
        Ok(target) => target,
        Err(err) => {
            log::trace!("{err}");
            return Ok(probe.classify(pid, &err));
        }
    };

    let target = target.to_string_lossy();
    let path = probe.pid_dir(pid).join("ns").join(kind.as_str());
    let id = parse_link_target(&target, &path)?;
    Ok(Probed::Present(Namespace::new(kind, id)))
}

/// Extracts the inode from a `<type>:[<inode>]` link target.
///
/// # Examples
///
/// ```
/// # use std::path::Path;
/// # use container_info::namespace::{parse_link_target, NamespaceId};
/// let id = parse_link_target("mnt:[4026531841]", Path::new("/proc/1/ns/mnt")).unwrap();
/// assert_eq!(id, NamespaceId::new(4026531841));
/// ```
pub fn parse_link_target(target: &str, path: &Path) -> Result<NamespaceId> {
    let malformed = || Error::MalformedLink {
        path: path.to_path_buf(),
        target: target.to_owned(),
    };

    let (_, inode) = target.split_once(':').ok_or_else(malformed)?;
    let inode = inode
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(malformed)?;
    inode.parse::<NamespaceId>().map_err(|_| malformed())
}
