use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::environment;
use crate::error::ResultOkLogExt;
use crate::fsutil::{Probe, Probed};
use crate::namespace::{self, NamespaceType};
use crate::process::{self, Process};

use super::{Error, Index, Result};

/// Counters describing one gather pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatherStats {
    /// Candidate pids found under the procfs root.
    pub pids: usize,
    /// Successful (namespace, pid) resolves that made it into the index.
    pub resolved: usize,
    /// Resolves that failed because the pid vanished or access was denied.
    pub transient: usize,
    /// Resolves for namespace types the kernel does not expose.
    pub unsupported: usize,
    /// Pids dropped because their status file could not be snapshotted.
    pub dropped: usize,
    pub elapsed: Duration,
}

/// Builds the index over the default namespace types.
///
/// # Errors
///
/// See [`gather_types`].
pub fn gather(probe: &Probe) -> Result<Index> {
    gather_types(probe, &NamespaceType::DEFAULT).map(|(index, _)| index)
}

/// Walks every pid once and records each of `types` it can resolve.
///
/// A pid is snapshotted at most once, on its first successful resolve, and the
/// record is shared by all its namespace entries. Anything that disappears
/// mid-scan is omitted; nothing is retried.
///
/// # Errors
///
/// - [`Error::Environment`] when not running on Linux.
/// - [`Error::Enumerate`] if the procfs root cannot be listed.
/// - [`Error::Namespace`] if the kernel reports a malformed namespace link.
pub fn gather_types(probe: &Probe, types: &[NamespaceType]) -> Result<(Index, GatherStats)> {
    environment::ensure_linux()?;

    let before = Instant::now();
    let mut index = Index::default();
    let mut stats = GatherStats::default();

    let pids = probe.pids().map_err(Error::Enumerate)?;
    stats.pids = pids.len();

    for pid in pids {
        let mut record: Option<Arc<Process>> = None;

        for &kind in types {
            let namespace = match namespace::resolve(probe, kind, pid)? {
                Probed::Present(namespace) => namespace,
                Probed::Transient(reason) => {
                    log::trace!("{kind} namespace of pid {pid} unavailable: {reason}");
                    stats.transient += 1;
                    continue;
                }
                Probed::Unsupported => {
                    stats.unsupported += 1;
                    continue;
                }
            };

            let process = match &record {
                Some(process) => Arc::clone(process),
                None => match take_snapshot(probe, pid) {
                    Some(process) => {
                        let process = Arc::new(process);
                        record = Some(Arc::clone(&process));
                        process
                    }
                    None => {
                        stats.dropped += 1;
                        break;
                    }
                },
            };

            index.insert(namespace, process);
            stats.resolved += 1;
        }
    }

    stats.elapsed = before.elapsed();
    log::debug!(
        "gathered {} namespaces from {} pids in {:?} (resolved={}, transient={}, unsupported={}, dropped={})",
        index.len(),
        stats.pids,
        stats.elapsed,
        stats.resolved,
        stats.transient,
        stats.unsupported,
        stats.dropped,
    );
    Ok((index, stats))
}

fn take_snapshot(probe: &Probe, pid: u32) -> Option<Process> {
    match process::snapshot(probe, pid).ok_log(log::Level::Warn)? {
        Probed::Present(process) => Some(process),
        other => {
            log::debug!("dropping pid {pid}: status unavailable ({other:?})");
            None
        }
    }
}
