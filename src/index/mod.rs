//! Two-way index between namespaces and processes.
//!
//! Built once per run by [`gather`]; it is a snapshot and never updated in
//! place. A process appears under namespace `N` iff `N` is listed for that
//! process's pid.
mod error;
mod gather;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use error::{Error, Result};
pub use gather::{GatherStats, gather, gather_types};

use crate::namespace::Namespace;
use crate::process::Process;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    /// Members of each namespace, in discovery order.
    namespaces: BTreeMap<Namespace, Vec<Arc<Process>>>,
    /// Namespaces of each pid, in probe order.
    processes: BTreeMap<u32, Vec<Namespace>>,
}

impl Index {
    /// Records that `process` belongs to `namespace`, on both sides of the index.
    pub fn insert(&mut self, namespace: Namespace, process: Arc<Process>) {
        self.processes
            .entry(process.pid)
            .or_default()
            .push(namespace);
        self.namespaces.entry(namespace).or_default().push(process);
    }

    /// Processes recorded for `namespace`, or `None` if it was never observed.
    pub fn members(&self, namespace: &Namespace) -> Option<&[Arc<Process>]> {
        self.namespaces.get(namespace).map(Vec::as_slice)
    }

    /// Namespaces recorded for `pid`, or `None` if the pid was never indexed.
    pub fn namespaces_of(&self, pid: u32) -> Option<&[Namespace]> {
        self.processes.get(&pid).map(Vec::as_slice)
    }

    /// Any snapshot of `pid`; all of them carry the same cgroup membership.
    pub fn process(&self, pid: u32) -> Option<&Process> {
        let namespace = self.namespaces_of(pid)?.first()?;
        self.members(namespace)?
            .iter()
            .find(|p| p.pid == pid)
            .map(Arc::as_ref)
    }

    /// Every indexed namespace with its members, ordered by type then id.
    pub fn namespaces(&self) -> impl Iterator<Item = (&Namespace, &[Arc<Process>])> {
        self.namespaces.iter().map(|(ns, members)| (ns, members.as_slice()))
    }

    /// Every indexed pid, ascending.
    pub fn pids(&self) -> impl Iterator<Item = u32> + '_ {
        self.processes.keys().copied()
    }

    /// Number of distinct namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fsutil::Probed;
    use crate::namespace::{NamespaceId, NamespaceType};
    use crate::process::Status;

    pub(crate) fn process(pid: u32, uid: u32, command: &str) -> Arc<Process> {
        Arc::new(Process::from_parts(
            Status {
                pid,
                ppid: 1,
                name: format!("proc{pid}"),
                state: "S (sleeping)".into(),
                threads: 1,
                uids: format!("{uid}\t{uid}\t{uid}\t{uid}"),
            },
            Probed::Present(format!("2:memory:/pid{pid}\n")),
            Probed::Present(command.into()),
        ))
    }

    pub(crate) fn ns(kind: NamespaceType, id: u64) -> Namespace {
        Namespace::new(kind, NamespaceId::new(id))
    }

    #[test]
    fn test_insert_is_symmetric() {
        let mut index = Index::default();
        let p = process(10, 0, "init");
        index.insert(ns(NamespaceType::Net, 100), Arc::clone(&p));
        index.insert(ns(NamespaceType::Pid, 200), Arc::clone(&p));

        assert_eq!(
            index.namespaces_of(10).unwrap(),
            &[ns(NamespaceType::Net, 100), ns(NamespaceType::Pid, 200)]
        );
        for namespace in index.namespaces_of(10).unwrap() {
            assert!(index.members(namespace).unwrap().iter().any(|m| m.pid == 10));
        }
        assert_eq!(index.len(), 2);
        assert_eq!(index.pids().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_lookup_misses() {
        let index = Index::default();
        assert!(index.is_empty());
        assert!(index.namespaces_of(1).is_none());
        assert!(index.members(&ns(NamespaceType::Uts, 1)).is_none());
        assert!(index.process(1).is_none());
    }

    #[test]
    fn test_process_lookup() {
        let mut index = Index::default();
        index.insert(ns(NamespaceType::Uts, 5), process(1, 0, "a"));
        index.insert(ns(NamespaceType::Uts, 5), process(2, 0, "b"));
        assert_eq!(index.process(2).unwrap().command(), "b");
        assert_eq!(index.members(&ns(NamespaceType::Uts, 5)).unwrap().len(), 2);
    }
}
