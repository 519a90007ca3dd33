use std::fmt;
use std::str::FromStr;

use super::{Error, Result};

/// A control file to watch, written `subsystem.controlfile`, e.g. `memory.usage_in_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    split: usize,
}

impl Column {
    /// Controller that owns the file, e.g. `memory`.
    pub fn subsystem(&self) -> &str {
        &self.name[..self.split]
    }

    /// Control-file name as it appears in the cgroup directory.
    pub fn control_file(&self) -> &str {
        &self.name
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason| Error::MalformedSpec {
            spec: s.to_owned(),
            reason,
        };
        let (subsystem, file) = s
            .split_once('.')
            .ok_or_else(|| malformed("column must look like subsystem.controlfile"))?;
        if subsystem.is_empty() || file.is_empty() {
            return Err(malformed("column must look like subsystem.controlfile"));
        }
        if s.contains('/') {
            return Err(malformed("column must not contain `/`"));
        }
        Ok(Self {
            name: s.to_owned(),
            split: subsystem.len(),
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What to monitor: `PID:COL[,COL...]`.
///
/// # Examples
///
/// ```
/// # use container_info::monitor::MonitorSpec;
/// let spec: MonitorSpec = "1234:memory.usage_in_bytes, cpu.shares".parse().unwrap();
/// assert_eq!(spec.pid, 1234);
/// assert_eq!(spec.columns[1].subsystem(), "cpu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSpec {
    pub pid: u32,
    pub columns: Vec<Column>,
}

impl FromStr for MonitorSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason| Error::MalformedSpec {
            spec: s.to_owned(),
            reason,
        };
        let (pid, columns) = s
            .split_once(':')
            .ok_or_else(|| malformed("expected PID:COLUMN[,COLUMN...]"))?;
        let pid = pid.trim();
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("pid must be decimal"));
        }
        let pid = pid.parse().map_err(|_| malformed("pid out of range"))?;

        let columns = columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Column>>>()?;
        if columns.is_empty() {
            return Err(malformed("at least one column is required"));
        }

        Ok(Self { pid, columns })
    }
}
