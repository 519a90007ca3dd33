//! Cgroup membership and live control-file values.
//!
//! # Key Components
//!
//! - [`AvailableCgroups`] — enabled controllers from `/proc/cgroups`, mapping a
//!   controller name such as `memory` to its [`HierarchyId`].
//! - [`CgroupEntry`] — one `hierarchy:controllers:path` line of `/proc/<pid>/cgroup`.
//! - [`usage`] — reads every control file of the cgroup a pid belongs to in a
//!   given hierarchy into a [`CgroupUsage`].
//!
//! # Layout
//!
//! Control-file directories are resolved under the cgroup root (normally
//! `/sys/fs/cgroup`): `<root>/<controllers>/<path>` for v1 hierarchies and
//! `<root>/<path>` for the unified v2 hierarchy, or `<root>/unified/<path>`
//! on hybrid hosts that mount it there.
mod available;
mod error;
mod membership;
mod usage;

pub use available::{AvailableCgroups, HierarchyId};
pub use error::{Error, Result};
pub use membership::CgroupEntry;
pub use usage::{CgroupUsage, read_control_files, usage, usage_for_process};
