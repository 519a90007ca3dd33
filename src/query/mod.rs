//! Read-only lookups over a gathered [`Index`].
mod error;
mod summary;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use error::{Error, Result};
pub use summary::{MAX_COMMAND_LEN, NamespaceSummary, truncate_command};

use crate::cgroup::{self, CgroupUsage, HierarchyId};
use crate::fsutil::Probe;
use crate::index::Index;
use crate::namespace::{Namespace, NamespaceId, NamespaceType};
use crate::process::Process;

/// A `PID:HIERARCHY` request for the control files of one cgroup.
///
/// # Examples
///
/// ```
/// # use container_info::query::CgroupSpec;
/// let spec: CgroupSpec = "1234:4".parse().unwrap();
/// assert_eq!(spec.pid, 1234);
/// assert!("1234:memory".parse::<CgroupSpec>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgroupSpec {
    pub pid: u32,
    pub hierarchy: HierarchyId,
}

impl FromStr for CgroupSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedSpec { spec: s.to_owned() };
        let (pid, hierarchy) = s.split_once(':').ok_or_else(malformed)?;
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let pid = pid.parse().map_err(|_| malformed())?;
        let hierarchy = hierarchy.parse().map_err(|_| malformed())?;
        Ok(Self { pid, hierarchy })
    }
}

impl fmt::Display for CgroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pid, self.hierarchy)
    }
}

/// Members of one namespace matched by an untyped id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceMembers<'a> {
    pub namespace: Namespace,
    pub processes: &'a [Arc<Process>],
}

/// Query layer over an index; every call reads the index, and cgroup lookups
/// additionally read live files through the probe.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    probe: &'a Probe,
    index: &'a Index,
}

impl<'a> Query<'a> {
    pub fn new(probe: &'a Probe, index: &'a Index) -> Self {
        Self { probe, index }
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    /// Namespaces of `pid` in probe order; `None` if the pid was never indexed.
    pub fn by_pid(&self, pid: u32) -> Option<&'a [Namespace]> {
        self.index.namespaces_of(pid)
    }

    /// Members of a fully specified namespace.
    pub fn by_namespace(&self, namespace: &Namespace) -> Option<&'a [Arc<Process>]> {
        self.index.members(namespace)
    }

    /// Looks up an id without a type by trying every default type in probe order.
    ///
    /// Each matching type yields its own group, so an inode that happens to be
    /// indexed under several types is reported once per type rather than merged.
    /// An empty result means the id is unknown.
    pub fn by_namespace_id(&self, id: NamespaceId) -> Vec<NamespaceMembers<'a>> {
        NamespaceType::DEFAULT
            .iter()
            .filter_map(|&kind| {
                let namespace = Namespace::new(kind, id);
                self.index
                    .members(&namespace)
                    .map(|processes| NamespaceMembers {
                        namespace,
                        processes,
                    })
            })
            .collect()
    }

    /// Reads the control files selected by a `PID:HIERARCHY` string.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedSpec`] if `spec` is not two colon-separated digit sequences.
    /// - [`Error::Cgroup`] if the pid or hierarchy is unknown, see [`Error::is_not_found`].
    pub fn by_cgroup_spec(&self, spec: &str) -> Result<CgroupUsage> {
        let spec: CgroupSpec = spec.parse()?;
        self.cgroup_usage(spec)
    }

    /// # Errors
    ///
    /// See [`Query::by_cgroup_spec`].
    pub fn cgroup_usage(&self, spec: CgroupSpec) -> Result<CgroupUsage> {
        Ok(cgroup::usage(self.probe, self.index, spec.pid, spec.hierarchy)?)
    }

    /// Aggregate view of every namespace, in index order.
    pub fn summaries(&self) -> Vec<NamespaceSummary> {
        self.index
            .namespaces()
            .filter_map(|(namespace, members)| NamespaceSummary::new(*namespace, members))
            .collect()
    }
}
