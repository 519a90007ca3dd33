use std::sync::Arc;

use crate::namespace::Namespace;
use crate::process::Process;

/// Commands are cut to this many bytes for display.
pub const MAX_COMMAND_LEN: usize = 20;

/// One row of the "show all" report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NamespaceSummary {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub nprocs: usize,
    /// Distinct effective uids of the members, ascending.
    pub uids: Vec<u32>,
    /// Command of the first member seen, truncated to [`MAX_COMMAND_LEN`] bytes.
    pub command: String,
}

impl NamespaceSummary {
    /// Returns `None` for a namespace without members, which the index never produces.
    pub fn new(namespace: Namespace, members: &[Arc<Process>]) -> Option<Self> {
        let first = members.first()?;

        let mut uids: Vec<u32> = members.iter().filter_map(|p| p.effective_uid()).collect();
        uids.sort_unstable();
        uids.dedup();

        Some(Self {
            namespace,
            nprocs: members.len(),
            uids,
            command: truncate_command(&first.command_line(), MAX_COMMAND_LEN),
        })
    }
}

/// Cuts `command` to at most `max` bytes.
///
/// The cut is byte-exact and not aware of character boundaries; a split
/// multi-byte character is rendered as U+FFFD.
pub fn truncate_command(command: &str, max: usize) -> String {
    let bytes = command.as_bytes();
    if bytes.len() <= max {
        return command.to_owned();
    }
    String::from_utf8_lossy(&bytes[..max]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::{ns, process};
    use crate::namespace::NamespaceType;

    #[test]
    fn test_truncate_command_is_byte_exact() {
        let command = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(command.len(), 25);
        assert_eq!(truncate_command(command, 20), "abcdefghijklmnopqrst");
        assert_eq!(truncate_command("short", 20), "short");
        assert_eq!(truncate_command("", 20), "");
    }

    #[test]
    fn test_truncate_command_splits_multibyte() {
        // 'é' is two bytes; cutting after its first byte must not panic.
        assert_eq!(truncate_command("aé", 2), "a\u{FFFD}");
    }

    #[test]
    fn test_uids_are_deduplicated_and_sorted() {
        let members = vec![
            process(10, 1000, "/usr/lib/systemd/systemd --user"),
            process(11, 0, "sshd"),
            process(12, 1000, "bash"),
            process(13, 33, "php-fpm"),
        ];
        let summary = NamespaceSummary::new(ns(NamespaceType::Pid, 4026531836), &members).unwrap();

        assert_eq!(summary.uids, vec![0, 33, 1000]);
        assert_eq!(summary.nprocs, 4);
        assert_eq!(summary.command, "/usr/lib/systemd/sys");
    }

    #[test]
    fn test_empty_members() {
        assert!(NamespaceSummary::new(ns(NamespaceType::Pid, 1), &[]).is_none());
    }
}
