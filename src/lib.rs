//! Container Info: introspection of Linux namespaces, processes and cgroups.
//!
//! A run gathers one [`index::Index`] from procfs, mapping every namespace to
//! its member processes and every pid to its namespaces, then answers a single
//! lookup against it or monitors one process's cgroup control files.
//!
//! Per-item read failures (a pid exiting mid-scan, a file the kernel does not
//! expose) are omitted where they happen. Only an unusable platform and
//! malformed caller input are reported as errors.
pub mod cgroup;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod index;
pub mod monitor;
pub mod namespace;
pub mod process;
pub mod query;
pub mod report;

use std::io::{self, Write};

use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use cgroup::AvailableCgroups;
use cli::{Args, Command};
use config::Config;
use error::{Error, Result, ResultOkLogExt};
use fsutil::Probe;
use index::Index;
use monitor::{Monitor, MonitorSpec};
use namespace::{NamespaceId, NamespaceType};
use query::{CgroupSpec, Query};
use report::Format;

/// Runs the lookup selected by `args`.
///
/// # Errors
///
/// - [`Error::Environment`] if the platform does not look like Linux procfs and cgroupfs.
/// - [`Error::Gather`] if procfs cannot be enumerated or reports a malformed namespace link.
/// - [`Error::Query`], [`Error::Monitor`] or [`Error::Namespace`] for malformed lookups,
///   see [`Error::is_user_error`].
/// - [`Error::Output`] if stdout cannot be written.
pub async fn run(args: &Args, config: &Config) -> Result<()> {
    let runtime_env = environment::detect_runtime_environment(&config.rootfs_mount);
    let rootfs = environment::select_rootfs(runtime_env, &config.rootfs_mount);
    log::debug!("Runtime environment: {runtime_env:?}, rootfs: {}", rootfs.display());

    let probe = config.probe(&rootfs);
    environment::ensure_supported(&probe)?;

    let (index, _) = index::gather_types(&probe, &NamespaceType::DEFAULT)?;
    let format = args.format();

    if let Command::Monitor(spec) = args.command() {
        return run_monitor(&probe, &index, spec, format).await;
    }

    let query = Query::new(&probe, &index);
    let mut out = io::stdout().lock();
    match args.command() {
        Command::Namespace(id) => {
            let id: NamespaceId = id.parse()?;
            let groups = query.by_namespace_id(id);
            if groups.is_empty() {
                report::not_found(&mut out, format)?;
            } else {
                report::namespace_members(&mut out, format, &groups)?;
            }
        }
        Command::Pid(pid) => match query.by_pid(pid) {
            Some(namespaces) => report::pid_namespaces(&mut out, format, pid, namespaces)?,
            None => report::not_found(&mut out, format)?,
        },
        Command::Cgroup(spec) => {
            let spec: CgroupSpec = spec.parse()?;
            match query.cgroup_usage(spec) {
                Ok(usage) => report::cgroup_usage(&mut out, format, spec, &usage)?,
                Err(err) if err.is_not_found() => {
                    log::debug!("cgroup lookup {spec}: {err}");
                    report::not_found(&mut out, format)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::ShowAll => report::summaries(&mut out, format, &query.summaries())?,
        Command::Monitor(_) => {}
    }
    out.flush()?;
    Ok(())
}

async fn run_monitor(probe: &Probe, index: &Index, spec: &str, format: Format) -> Result<()> {
    let spec: MonitorSpec = spec.parse()?;
    let available = AvailableCgroups::load(probe)
        .ok_log(log::Level::Warn)
        .unwrap_or_default();

    let monitor = match Monitor::new(probe, index, &available, spec) {
        Ok(monitor) => monitor,
        Err(monitor::Error::ProcessUnavailable(pid)) => {
            log::debug!("pid {pid} is not available for monitoring");
            report::not_found(&mut io::stdout().lock(), format)?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone())?;

    let mut written = Ok(());
    monitor
        .run(cancel.clone(), |frame| {
            if let Err(err) = report::frame(&mut io::stdout().lock(), format, frame) {
                written = Err(err);
                cancel.cancel();
            }
        })
        .await;
    Ok(written?)
}

/// Cancels `cancel` on SIGINT or SIGTERM.
fn cancel_on_signal(cancel: CancellationToken) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).map_err(Error::Signal)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(Error::Signal)?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => log::debug!("received SIGINT, stopping"),
            _ = sigterm.recv() => log::debug!("received SIGTERM, stopping"),
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });
    Ok(())
}
