//! Command-line arguments.
//!
//! At most one lookup runs per invocation. When several are given the first
//! one in the order namespace, pid, cgroup, monitor wins; with none, every
//! namespace is listed.
use clap::Parser;

use crate::report::Format;

#[derive(Parser, Debug, Default)]
#[command(
    name = "container-info",
    about = "Lists Linux namespaces, their member processes and cgroup usage",
    version
)]
pub struct Args {
    /// List the processes in the namespace with this id
    #[arg(long, value_name = "ID")]
    pub namespace: Option<String>,

    /// List the namespaces this process belongs to
    #[arg(long)]
    pub pid: Option<u32>,

    /// Show the control files of a process's cgroup
    #[arg(long, value_name = "PID:HIERARCHY")]
    pub cgroup: Option<String>,

    /// Print the given control files of a process every second
    #[arg(long, value_name = "PID:COL[,COL...]")]
    pub monitor: Option<String>,

    /// Emit JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

/// The lookup selected by the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Namespace(&'a str),
    Pid(u32),
    Cgroup(&'a str),
    Monitor(&'a str),
    ShowAll,
}

impl Args {
    pub fn command(&self) -> Command<'_> {
        if let Some(id) = &self.namespace {
            Command::Namespace(id)
        } else if let Some(pid) = self.pid {
            Command::Pid(pid)
        } else if let Some(spec) = &self.cgroup {
            Command::Cgroup(spec)
        } else if let Some(spec) = &self.monitor {
            Command::Monitor(spec)
        } else {
            Command::ShowAll
        }
    }

    pub fn format(&self) -> Format {
        if self.json { Format::Json } else { Format::Text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_priority() {
        let args = Args::parse_from([
            "container-info",
            "--monitor",
            "1:memory.stat",
            "--pid",
            "1",
            "--namespace",
            "4026531836",
        ]);
        assert_eq!(args.command(), Command::Namespace("4026531836"));

        let args = Args::parse_from(["container-info", "--cgroup", "1:2", "--pid", "7"]);
        assert_eq!(args.command(), Command::Pid(7));

        let args = Args::parse_from(["container-info", "--monitor", "1:cpu.shares", "--cgroup", "1:2"]);
        assert_eq!(args.command(), Command::Cgroup("1:2"));

        let args = Args::parse_from(["container-info", "--json"]);
        assert_eq!(args.command(), Command::ShowAll);
        assert_eq!(args.format(), Format::Json);
    }

    #[test]
    fn test_pid_must_be_numeric() {
        assert!(Args::try_parse_from(["container-info", "--pid", "abc"]).is_err());
    }
}
