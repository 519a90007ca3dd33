//! Parser for `/proc/<pid>/status`.
//!
//! Every line has the shape `Key:\tvalue`. Only the keys this crate needs are
//! extracted; the file carries many more and unknown keys are skipped, so new
//! kernel fields never break parsing.

use std::collections::HashMap;
use std::io::BufRead;
use std::num::ParseIntError;
use std::path::Path;
use std::sync::LazyLock;

use super::{Error, Result};

/// The subset of `/proc/<pid>/status` kept for a process snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub state: String,
    pub threads: u32,
    /// Raw `Uid:` value: real, effective, saved set and filesystem uid.
    pub uids: String,
}

impl Status {
    fn set_pid(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.pid = v.parse()?;
        Ok(())
    }

    fn set_ppid(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.ppid = v.parse()?;
        Ok(())
    }

    fn set_name(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.name = v.to_owned();
        Ok(())
    }

    fn set_state(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.state = v.to_owned();
        Ok(())
    }

    fn set_threads(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.threads = v.parse()?;
        Ok(())
    }

    fn set_uids(&mut self, v: &str) -> std::result::Result<(), ParseIntError> {
        self.uids = v.to_owned();
        Ok(())
    }

    /// Parses a status file from `buf`; `origin` only feeds error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadLine`] if reading fails and [`Error::InvalidKeyValue`]
    /// if a numeric field holds something else.
    pub fn from_reader<R: BufRead>(buf: &mut R, origin: &Path) -> Result<Self> {
        let mut status = Self::default();
        let mut line = Vec::with_capacity(128);
        let mut lineno = 0;

        loop {
            line.clear();
            let n = buf
                .read_until(b'\n', &mut line)
                .map_err(|source| Error::ReadLine {
                    path: origin.to_path_buf(),
                    line: lineno + 1,
                    source,
                })?;
            if n == 0 {
                break;
            }
            lineno += 1;

            let text = String::from_utf8_lossy(&line);
            let Some((key, value)) = text.split_once(':') else {
                continue;
            };
            let Some((&key, setter)) = SETTERS.get_key_value(key) else {
                continue;
            };
            let value = value.trim();
            setter(&mut status, value).map_err(|source| Error::InvalidKeyValue {
                path: origin.to_path_buf(),
                key,
                value: value.to_owned(),
                line: lineno,
                source,
            })?;
        }

        Ok(status)
    }
}

type Setter = fn(&mut Status, &str) -> std::result::Result<(), ParseIntError>;

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(6);

    m.insert("Pid", Status::set_pid);
    m.insert("PPid", Status::set_ppid);
    m.insert("Name", Status::set_name);
    m.insert("State", Status::set_state);
    m.insert("Threads", Status::set_threads);
    m.insert("Uid", Status::set_uids);

    m
});
