//! Environment detection and validation.
//!
//! Determines whether the program runs on the host or inside a container,
//! picks the matching root filesystem, and refuses to start on anything that
//! does not look like a Linux procfs and cgroup layout.
mod checks;
mod detect;
mod error;

pub use checks::{ensure_linux, ensure_supported};
pub use detect::{RuntimeEnvironment, detect_runtime_environment, select_rootfs};
pub use error::{Error, Result};
