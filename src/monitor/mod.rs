//! Live monitoring of one process's cgroup control files.
//!
//! The process is snapshotted once when the monitor is created. Every tick
//! the monitor re-reads the requested control files and hands a [`Frame`] to
//! the caller, until the cancellation token fires. The index is never rebuilt.
mod error;
mod spec;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub use error::{Error, Result};
pub use spec::{Column, MonitorSpec};

use crate::cgroup::{self, AvailableCgroups, CgroupUsage, HierarchyId};
use crate::error::ResultOkLogExt;
use crate::fsutil::{Probe, Probed};
use crate::index::Index;
use crate::namespace::Namespace;
use crate::process::{self, Process};

/// Time between two frames.
pub const INTERVAL: Duration = Duration::from_secs(1);

/// One rendered tick.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Frame {
    /// UNIX epoch seconds.
    pub timestamp: u64,
    pub process: Arc<Process>,
    pub namespaces: Vec<Namespace>,
    /// Resolved columns in request order; unresolved ones are left out.
    pub values: Vec<(String, String)>,
}

/// Polls a fixed set of control files for one process.
#[derive(Debug)]
pub struct Monitor<'a> {
    probe: &'a Probe,
    index: &'a Index,
    available: &'a AvailableCgroups,
    process: Arc<Process>,
    columns: Vec<Column>,
}

impl<'a> Monitor<'a> {
    /// Takes the one-off snapshot of the monitored process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessUnavailable`] if the process status cannot be read.
    pub fn new(
        probe: &'a Probe,
        index: &'a Index,
        available: &'a AvailableCgroups,
        spec: MonitorSpec,
    ) -> Result<Self> {
        let process = match process::snapshot(probe, spec.pid)? {
            Probed::Present(process) => process,
            _ => return Err(Error::ProcessUnavailable(spec.pid)),
        };
        Ok(Self {
            probe,
            index,
            available,
            process: Arc::new(process),
            columns: spec.columns,
        })
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Reads the current values of every column.
    ///
    /// A column whose subsystem is not enabled, or whose cgroup cannot be read,
    /// is omitted from the frame.
    pub fn frame(&self) -> Frame {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let namespaces = self
            .index
            .namespaces_of(self.process.pid)
            .map(<[Namespace]>::to_vec)
            .unwrap_or_default();

        // Columns of the same hierarchy share one directory read per frame.
        let mut cache: HashMap<HierarchyId, Option<CgroupUsage>> = HashMap::new();
        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let Some(hierarchy) = self.available.hierarchy(column.subsystem()) else {
                log::trace!("subsystem `{}` not available", column.subsystem());
                continue;
            };
            let usage = cache
                .entry(hierarchy)
                .or_insert_with(|| self.usage(hierarchy));
            if let Some(value) = usage
                .as_ref()
                .and_then(|u| u.single_line(column.control_file()))
            {
                values.push((column.to_string(), value));
            }
        }

        Frame {
            timestamp,
            process: Arc::clone(&self.process),
            namespaces,
            values,
        }
    }

    fn usage(&self, hierarchy: HierarchyId) -> Option<CgroupUsage> {
        let result = match cgroup::usage(self.probe, self.index, self.process.pid, hierarchy) {
            // Started after the gather; fall back to the monitor's own snapshot.
            Err(cgroup::Error::UnknownPid(_)) => {
                cgroup::usage_for_process(self.probe, &self.process, hierarchy)
            }
            other => other,
        };
        result.ok_log(log::Level::Debug)
    }

    /// Emits a frame immediately and then every [`INTERVAL`] until `cancel` fires.
    pub async fn run<F>(&self, cancel: CancellationToken, mut emit: F)
    where
        F: FnMut(&Frame),
    {
        let mut interval = ticker();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::debug!("monitor for pid {} cancelled", self.process.pid);
                    break;
                }
                _ = interval.tick() => {
                    let before = std::time::Instant::now();
                    let frame = self.frame();
                    log::trace!("frame() took {} nanoseconds", before.elapsed().as_nanos());
                    emit(&frame);
                }
            }
        }
    }
}

/// Ticks every [`INTERVAL`]; a slow frame pushes the next tick back instead of
/// letting missed ticks fire in a burst.
fn ticker() -> Interval {
    let mut interval = tokio::time::interval(INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn fixture(root: &Path) -> Probe {
        let pid_dir = root.join("proc/321");
        std::fs::create_dir_all(&pid_dir).unwrap();
        std::fs::write(
            pid_dir.join("status"),
            "Name:\tpostgres\nState:\tS (sleeping)\nPid:\t321\nPPid:\t1\nUid:\t70\t70\t70\t70\nThreads:\t6\n",
        )
        .unwrap();
        std::fs::write(pid_dir.join("cgroup"), "3:memory:/db\n2:cpu,cpuacct:/db\n").unwrap();
        std::fs::write(pid_dir.join("cmdline"), "postgres\0-D\0/data\0").unwrap();

        let memory = root.join("cgroup/memory/db");
        std::fs::create_dir_all(&memory).unwrap();
        std::fs::write(memory.join("memory.usage_in_bytes"), "1048576\n").unwrap();
        std::fs::write(memory.join("memory.stat"), "cache 10\nrss 20\n").unwrap();

        let cpu = root.join("cgroup/cpu,cpuacct/db");
        std::fs::create_dir_all(&cpu).unwrap();
        std::fs::write(cpu.join("cpu.shares"), "512\n").unwrap();

        Probe::new(root.join("proc"), root.join("cgroup"))
    }

    fn available() -> AvailableCgroups {
        [
            ("cpu".to_string(), HierarchyId::new(2)),
            ("cpuacct".to_string(), HierarchyId::new(2)),
            ("memory".to_string(), HierarchyId::new(3)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_frame_values_in_request_order() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = fixture(tmp.path());
        let index = Index::default();
        let available = available();
        let spec = "321:memory.stat,cpu.shares,memory.usage_in_bytes".parse().unwrap();
        let monitor = Monitor::new(&probe, &index, &available, spec).unwrap();

        let frame = monitor.frame();
        assert_eq!(frame.process.name, "postgres");
        assert!(frame.namespaces.is_empty());
        assert_eq!(
            frame.values,
            vec![
                ("memory.stat".to_string(), "cache 10 rss 20".to_string()),
                ("cpu.shares".to_string(), "512".to_string()),
                ("memory.usage_in_bytes".to_string(), "1048576".to_string()),
            ]
        );
    }

    #[test]
    fn test_unavailable_subsystem_is_omitted() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = fixture(tmp.path());
        let index = Index::default();
        let available = available();
        let spec = "321:blkio.weight,memory.usage_in_bytes,memory.missing_file".parse().unwrap();
        let monitor = Monitor::new(&probe, &index, &available, spec).unwrap();

        let frame = monitor.frame();
        assert_eq!(
            frame.values,
            vec![("memory.usage_in_bytes".to_string(), "1048576".to_string())]
        );
    }

    #[test]
    fn test_missing_process() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = fixture(tmp.path());
        let index = Index::default();
        let available = available();
        let spec = "999:memory.stat".parse().unwrap();
        assert!(matches!(
            Monitor::new(&probe, &index, &available, spec),
            Err(Error::ProcessUnavailable(999))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = fixture(tmp.path());
        let index = Index::default();
        let available = available();
        let spec = "321:blkio.weight,cpu.shares".parse().unwrap();
        let monitor = Monitor::new(&probe, &index, &available, spec).unwrap();

        let cancel = CancellationToken::new();
        let mut frames = Vec::new();
        let start = tokio::time::Instant::now();
        monitor
            .run(cancel.clone(), |frame| {
                frames.push(frame.clone());
                if frames.len() == 3 {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.values.len() == 1));
        assert_eq!(start.elapsed(), INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_frame_delays_next_tick() {
        let mut interval = ticker();
        assert_eq!(interval.missed_tick_behavior(), MissedTickBehavior::Delay);

        let start = tokio::time::Instant::now();
        interval.tick().await;
        tokio::time::advance(INTERVAL * 3 + Duration::from_millis(500)).await;
        interval.tick().await;
        let late = tokio::time::Instant::now();
        interval.tick().await;
        assert_eq!(late - start, INTERVAL * 3 + Duration::from_millis(500));
        assert_eq!(tokio::time::Instant::now() - late, INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancelled_before_start() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = fixture(tmp.path());
        let index = Index::default();
        let available = available();
        let spec = "321:cpu.shares".parse().unwrap();
        let monitor = Monitor::new(&probe, &index, &available, spec).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut count = 0;
        monitor.run(cancel, |_| count += 1).await;
        assert_eq!(count, 0);
    }
}
