use crate::fsutil::{Probe, Probed};

use super::{Error, Process, Result, Status};

/// Takes a snapshot of `pid`.
///
/// Only the status file is mandatory. The cgroup and cmdline files are read
/// best-effort: a failure leaves that field non-present instead of failing the
/// whole snapshot.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyValue`] if the status file holds a non-numeric
/// value for a numeric key. A status file that cannot be opened or read is
/// reported through the returned [`Probed`] instead.
pub fn snapshot(probe: &Probe, pid: u32) -> Result<Probed<Process>> {
    let mut reader = match probe.open_pid_file(pid, "status") {
        Ok(reader) => reader,
        Err(err) => {
            log::trace!("{err}");
            return Ok(probe.classify(pid, &err));
        }
    };

    let path = probe.pid_dir(pid).join("status");
    let mut status = match Status::from_reader(&mut reader, &path) {
        Ok(status) => status,
        // ESRCH while reading: the process exited after the open.
        Err(Error::ReadLine { source, .. }) => {
            log::trace!("pid {pid} vanished while reading status: {source}");
            return Ok(Probed::Transient(source.kind()));
        }
        Err(err) => return Err(err),
    };
    // The directory name is authoritative; the `Pid:` line may be missing.
    status.pid = pid;

    let cgroups = probe
        .read_pid_file(pid, "cgroup")
        .map(|raw| String::from_utf8_lossy(&raw).into_owned());
    let command = probe
        .read_pid_file(pid, "cmdline")
        .map(|raw| trim_command(&raw));

    Ok(Probed::Present(Process::from_parts(status, cgroups, command)))
}

/// Decodes a raw argument vector, dropping surrounding whitespace and the trailing NUL.
fn trim_command(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pid(root: &std::path::Path, pid: u32, files: &[(&str, &[u8])]) {
        let dir = root.join(pid.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn test_snapshot_reads_all_sources() {
        let tmp = tempfile::tempdir().unwrap();
        write_pid(
            tmp.path(),
            42,
            &[
                (
                    "status",
                    b"Name:\tsleep\nState:\tS (sleeping)\nPid:\t42\nPPid:\t1\nUid:\t0\t0\t0\t0\nThreads:\t1\n",
                ),
                ("cgroup", b"4:memory:/user.slice\n1:cpu:/user.slice\n"),
                ("cmdline", b"sleep\x00100\x00"),
            ],
        );
        let probe = Probe::new(tmp.path(), tmp.path());

        let process = snapshot(&probe, 42).unwrap().into_present().unwrap();
        assert_eq!(process.pid, 42);
        assert_eq!(process.ppid, 1);
        assert_eq!(process.name, "sleep");
        assert_eq!(process.threads, 1);
        assert_eq!(
            process.cgroups,
            Probed::Present("4:memory:/user.slice\n1:cpu:/user.slice\n".into())
        );
        assert_eq!(process.command, Probed::Present("sleep\x00100".into()));
    }

    #[test]
    fn test_snapshot_tolerates_missing_optional_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_pid(tmp.path(), 7, &[("status", b"Name:\tkthreadd\nPid:\t7\n")]);
        let probe = Probe::new(tmp.path(), tmp.path());

        let process = snapshot(&probe, 7).unwrap().into_present().unwrap();
        assert_eq!(process.name, "kthreadd");
        assert_eq!(process.cgroups, Probed::Unsupported);
        assert_eq!(process.command, Probed::Unsupported);
    }

    #[test]
    fn test_snapshot_pid_comes_from_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_pid(tmp.path(), 12, &[("status", b"Name:\tbash\nPPid:\t1\n")]);
        let probe = Probe::new(tmp.path(), tmp.path());
        let process = snapshot(&probe, 12).unwrap().into_present().unwrap();
        assert_eq!(process.pid, 12);
        assert_eq!(process.ppid, 1);
    }

    #[test]
    fn test_snapshot_missing_status_is_not_present() {
        let tmp = tempfile::tempdir().unwrap();
        let probe = Probe::new(tmp.path(), tmp.path());
        assert_eq!(
            snapshot(&probe, 99).unwrap(),
            Probed::Transient(std::io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_trim_command() {
        assert_eq!(trim_command(b"  /bin/sh\x00-c\x00true\x00\n"), "/bin/sh\x00-c\x00true");
        assert_eq!(trim_command(b""), "");
    }
}
