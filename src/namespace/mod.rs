//! Kernel namespace identities.
//!
//! A namespace is identified by its type and the inode number the kernel
//! exposes through `/proc/<pid>/ns/<type>`, whose link target reads
//! `<type>:[<inode>]`. Two processes share a namespace iff both values match.
mod error;
mod resolve;

use std::fmt;
use std::str::FromStr;

pub use error::{Error, Result};
pub use resolve::{parse_link_target, resolve};

/// The namespace types known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceType {
    /// `CLONE_NEWNS`, mount points.
    #[serde(rename = "mnt")]
    Mount,
    /// `CLONE_NEWUTS`, hostname and NIS domain name.
    Uts,
    /// `CLONE_NEWIPC`, System V IPC and POSIX message queues.
    Ipc,
    /// `CLONE_NEWPID`, process ids.
    Pid,
    /// `CLONE_NEWNET`, network devices, stacks and ports.
    Net,
    /// `CLONE_NEWUSER`, user and group ids.
    User,
    /// `CLONE_NEWCGROUP`, cgroup root directory.
    Cgroup,
}

impl NamespaceType {
    /// Types probed by a default gather, in probe order. `cgroup` is deliberately absent.
    pub const DEFAULT: [NamespaceType; 6] = [
        NamespaceType::Mount,
        NamespaceType::Uts,
        NamespaceType::Ipc,
        NamespaceType::Pid,
        NamespaceType::Net,
        NamespaceType::User,
    ];

    /// File name of this type under `/proc/<pid>/ns/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceType::Mount => "mnt",
            NamespaceType::Uts => "uts",
            NamespaceType::Ipc => "ipc",
            NamespaceType::Pid => "pid",
            NamespaceType::Net => "net",
            NamespaceType::User => "user",
            NamespaceType::Cgroup => "cgroup",
        }
    }
}

impl fmt::Display for NamespaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mnt" | "mount" => Ok(NamespaceType::Mount),
            "uts" => Ok(NamespaceType::Uts),
            "ipc" => Ok(NamespaceType::Ipc),
            "pid" => Ok(NamespaceType::Pid),
            "net" => Ok(NamespaceType::Net),
            "user" => Ok(NamespaceType::User),
            "cgroup" => Ok(NamespaceType::Cgroup),
            other => Err(Error::UnknownType(other.to_owned())),
        }
    }
}

/// Kernel-assigned inode number of a namespace.
///
/// # Examples
///
/// ```
/// # use container_info::namespace::NamespaceId;
/// let id: NamespaceId = "4026531836".parse().unwrap();
/// assert_eq!(id.to_string(), "4026531836");
/// assert!("net:[4026531836]".parse::<NamespaceId>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
#[serde(transparent)]
pub struct NamespaceId(u64);

impl NamespaceId {
    pub fn new(inode: u64) -> Self {
        Self(inode)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl FromStr for NamespaceId {
    type Err = Error;

    /// Accepts a non-empty string of ASCII digits only; signs and whitespace are rejected.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidId(s.to_owned()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidId(s.to_owned()))
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A namespace identity; usable as a map key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
pub struct Namespace {
    #[serde(rename = "type")]
    pub kind: NamespaceType,
    pub id: NamespaceId,
}

impl Namespace {
    pub fn new(kind: NamespaceType, id: NamespaceId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[{}]", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips_through_link_name() {
        for kind in NamespaceType::DEFAULT {
            assert_eq!(kind.as_str().parse::<NamespaceType>().unwrap(), kind);
        }
        assert_eq!(
            "cgroup".parse::<NamespaceType>().unwrap(),
            NamespaceType::Cgroup
        );
        assert!(matches!(
            "time".parse::<NamespaceType>(),
            Err(Error::UnknownType(t)) if t == "time"
        ));
    }

    #[test]
    fn test_default_types_exclude_cgroup() {
        assert!(!NamespaceType::DEFAULT.contains(&NamespaceType::Cgroup));
        assert_eq!(NamespaceType::DEFAULT[0], NamespaceType::Mount);
        assert_eq!(NamespaceType::DEFAULT[5], NamespaceType::User);
    }

    #[test]
    fn test_namespace_id_rejects_non_digits() {
        assert!("".parse::<NamespaceId>().is_err());
        assert!("-1".parse::<NamespaceId>().is_err());
        assert!(" 12".parse::<NamespaceId>().is_err());
        assert!("+12".parse::<NamespaceId>().is_err());
        assert_eq!(
            "4026531840".parse::<NamespaceId>().unwrap(),
            NamespaceId::new(4026531840)
        );
    }

    #[test]
    fn test_namespace_display_matches_kernel_format() {
        let ns = Namespace::new(NamespaceType::Net, NamespaceId::new(4026531992));
        assert_eq!(ns.to_string(), "net:[4026531992]");
    }
}
