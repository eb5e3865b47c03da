//! Check executor: one check, one subprocess, one normalized result.
//!
//! The executor interprets none of the forwarded flags; it spawns the check,
//! captures merged stdout+stderr, and enforces a hard wall-clock timeout. A
//! timed-out child is killed and reaped so it never outlives its worker slot.

use crate::models::{CheckDescriptor, CheckResult, Status};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Hard wall-clock limit for one check.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Soft threshold; slower-but-successful runs are flagged, not failed.
pub const SLOW_THRESHOLD: Duration = Duration::from_secs(60);

/// Poll interval for the child's exit while the deadline has not passed.
const WAIT_POLL: Duration = Duration::from_millis(25);

/// Boolean switches forwarded verbatim to every child check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub debug: bool,
    pub autofix: bool,
    pub dry_run: bool,
}

impl RunFlags {
    fn as_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.debug {
            args.push("--debug");
        }
        if self.autofix {
            args.push("--autofix");
        }
        if self.dry_run {
            args.push("--dry-run");
        }
        args
    }
}

fn error_result(desc: &CheckDescriptor, message: String) -> CheckResult {
    CheckResult {
        script: desc.name.clone(),
        category: desc.category.clone(),
        status: Status::Error,
        output: message,
        slow: false,
    }
}

// Drains one pipe on its own thread; joined after a normal exit so a full
// pipe buffer can never deadlock the wait loop.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut s) = stream {
            let _ = s.read_to_string(&mut buf);
        }
        buf
    })
}

/// Run one check to completion or to the timeout.
///
/// - exit 0 → `PASS`
/// - any other exit (or death by signal) → `FAIL` with merged stdout+stderr
/// - deadline elapsed → child killed and reaped, `TIMEOUT`
/// - spawn/communicate failure → `ERROR` with the exception text
pub fn execute(desc: &CheckDescriptor, flags: &RunFlags, timeout: Duration) -> CheckResult {
    let mut child = match Command::new(&desc.path)
        .args(flags.as_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            return error_result(desc, format!("failed to spawn {}: {}", desc.name, e));
        }
    };

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let deadline = start + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Reader threads are left to drain on their own: a
                    // grandchild may still hold the pipes open, and the
                    // timeout message replaces the output anyway.
                    drop(stdout);
                    drop(stderr);
                    return CheckResult {
                        script: desc.name.clone(),
                        category: desc.category.clone(),
                        status: Status::Timeout,
                        output: format!(
                            "Check timed out after {} seconds: {}",
                            timeout.as_secs(),
                            desc.name
                        ),
                        slow: false,
                    };
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                drop(stdout);
                drop(stderr);
                return error_result(desc, format!("failed to wait on {}: {}", desc.name, e));
            }
        }
    };

    let elapsed = start.elapsed();
    let mut output = stdout.join().unwrap_or_default();
    output.push_str(&stderr.join().unwrap_or_default());

    CheckResult {
        script: desc.name.clone(),
        category: desc.category.clone(),
        status: if status.success() {
            Status::Pass
        } else {
            Status::Fail
        },
        output,
        slow: elapsed > SLOW_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn desc(name: &str, path: PathBuf) -> CheckDescriptor {
        CheckDescriptor {
            name: name.to_string(),
            category: "testing".to_string(),
            path,
        }
    }

    #[test]
    fn test_exit_zero_is_pass() {
        let dir = tempdir().unwrap();
        let p = write_executable(dir.path(), "ok.sh", "#!/bin/sh\necho fine\nexit 0\n");
        let r = execute(&desc("ok.sh", p), &RunFlags::default(), DEFAULT_TIMEOUT);
        assert_eq!(r.status, Status::Pass);
        assert!(r.output.contains("fine"));
        assert!(!r.slow);
    }

    #[test]
    fn test_nonzero_exit_is_fail_with_merged_output() {
        let dir = tempdir().unwrap();
        let p = write_executable(
            dir.path(),
            "bad.sh",
            "#!/bin/sh\necho violation\necho detail >&2\nexit 3\n",
        );
        let r = execute(&desc("bad.sh", p), &RunFlags::default(), DEFAULT_TIMEOUT);
        assert_eq!(r.status, Status::Fail);
        assert!(r.output.contains("violation"));
        assert!(r.output.contains("detail"));
    }

    #[test]
    fn test_missing_executable_is_error() {
        let dir = tempdir().unwrap();
        let r = execute(
            &desc("ghost.sh", dir.path().join("ghost.sh")),
            &RunFlags::default(),
            DEFAULT_TIMEOUT,
        );
        assert_eq!(r.status, Status::Error);
        assert!(r.output.contains("ghost.sh"));
    }

    #[test]
    fn test_timeout_kills_child_and_is_bounded() {
        let dir = tempdir().unwrap();
        let p = write_executable(dir.path(), "hang.sh", "#!/bin/sh\nsleep 60\n");
        let start = Instant::now();
        let r = execute(
            &desc("hang.sh", p),
            &RunFlags::default(),
            Duration::from_millis(300),
        );
        assert_eq!(r.status, Status::Timeout);
        assert!(r.output.contains("timed out"));
        // Bounded by the timeout plus a small constant, not the child's sleep.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_flags_forwarded_to_child() {
        let dir = tempdir().unwrap();
        let p = write_executable(dir.path(), "args.sh", "#!/bin/sh\necho \"$@\"\nexit 0\n");
        let flags = RunFlags {
            debug: true,
            autofix: false,
            dry_run: true,
        };
        let r = execute(&desc("args.sh", p), &flags, DEFAULT_TIMEOUT);
        assert_eq!(r.status, Status::Pass);
        assert!(r.output.contains("--debug"));
        assert!(r.output.contains("--dry-run"));
        assert!(!r.output.contains("--autofix"));
    }
}
