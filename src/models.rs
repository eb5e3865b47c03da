//! Shared data models for check discovery and run results.

use serde::Serialize;
use std::path::PathBuf;

/// Outcome classification for one executed check.
///
/// `Pass` and `Fail` reflect the child's own exit code; `Timeout` means the
/// bounded wait elapsed and the child was killed; `Error` means the executor
/// could not spawn or observe the process at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    Timeout,
    Error,
}

impl Status {
    /// Failure-class statuses count toward exit code 1 when no error is present.
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Fail | Status::Timeout)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Timeout => "TIMEOUT",
            Status::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One discoverable rule check.
pub struct CheckDescriptor {
    /// File name of the check; unique id within a registry.
    pub name: String,
    /// Lower-cased category tag, or `"uncategorized"`.
    pub category: String,
    /// Location used to invoke the check.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of running one check.
pub struct CheckResult {
    pub script: String,
    pub category: String,
    pub status: Status,
    /// Merged stdout+stderr, or the timeout/exception message.
    pub output: String,
    /// Set when a passing/failing run exceeded the soft duration threshold.
    pub slow: bool,
}

#[derive(Debug, Clone, Serialize)]
/// Aggregated counts used by the report printers.
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub timeouts: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut s = RunSummary {
            passed: 0,
            failed: 0,
            errors: 0,
            timeouts: 0,
            total: results.len(),
        };
        for r in results {
            match r.status {
                Status::Pass => s.passed += 1,
                Status::Fail => s.failed += 1,
                Status::Timeout => s.timeouts += 1,
                Status::Error => s.errors += 1,
            }
        }
        s
    }
}
