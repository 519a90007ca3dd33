use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use crate::fsutil::Probe;

use super::{Error, Result};

/// Hierarchy id as listed in `/proc/cgroups` and `/proc/<pid>/cgroup`.
///
/// cgroup v1 hierarchies are numbered from 1; the unified v2 hierarchy is always 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
#[serde(transparent)]
pub struct HierarchyId(u32);

impl HierarchyId {
    pub const UNIFIED: HierarchyId = HierarchyId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl FromStr for HierarchyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidHierarchyId(s.to_owned()));
        }
        s.parse()
            .map(Self)
            .map_err(|_| Error::InvalidHierarchyId(s.to_owned()))
    }
}

impl fmt::Display for HierarchyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enabled cgroup controllers and the hierarchy each one is attached to.
///
/// Parsed once from `/proc/cgroups`, whose lines read
/// `subsys_name hierarchy num_cgroups enabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct AvailableCgroups {
    by_name: BTreeMap<String, HierarchyId>,
}

impl AvailableCgroups {
    /// Loads `<proc>/cgroups`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn load(probe: &Probe) -> Result<Self> {
        let mut reader = probe.open_available_cgroups()?;
        Self::from_reader(&mut reader, &probe.proc_root().join("cgroups"))
    }

    /// Parses `/proc/cgroups` content, keeping only enabled controllers.
    ///
    /// `#` comment lines and lines with fewer than four fields are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadLine`] if reading fails.
    pub fn from_reader<R: BufRead>(buf: &mut R, origin: &Path) -> Result<Self> {
        let mut by_name = BTreeMap::new();
        let mut line = String::with_capacity(64);

        while buf.read_line(&mut line).map_err(|source| Error::ReadLine {
            path: origin.to_path_buf(),
            source,
        })? != 0
        {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                let fields: Vec<&str> = trimmed.split_whitespace().collect();
                match fields.as_slice() {
                    [name, hierarchy, _, "1", ..] => match hierarchy.parse::<HierarchyId>() {
                        Ok(id) => {
                            by_name.insert((*name).to_owned(), id);
                        }
                        Err(err) => log::debug!("skipping `{trimmed}` in cgroups: {err}"),
                    },
                    [_, _, _, _, ..] => {}
                    _ => log::debug!("skipping short line `{trimmed}` in cgroups"),
                }
            }
            line.clear();
        }

        log::debug!("available cgroups: {by_name:?}");
        Ok(Self { by_name })
    }

    /// Hierarchy id of an enabled controller.
    pub fn hierarchy(&self, subsystem: &str) -> Option<HierarchyId> {
        self.by_name.get(subsystem).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, HierarchyId)> {
        self.by_name.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<(String, HierarchyId)> for AvailableCgroups {
    fn from_iter<I: IntoIterator<Item = (String, HierarchyId)>>(iter: I) -> Self {
        Self {
            by_name: iter.into_iter().collect(),
        }
    }
}
