//! Orchestrator: selection, sequential/parallel execution, exit codes.
//!
//! Parallel execution is an optimization, never a semantic change: both modes
//! produce the same result set for the same selection, and the collected
//! results are re-sorted by script name before reporting. Checks run in
//! separate processes, so the only shared structure is the result vector the
//! pool collects into.

use crate::executor::{self, RunFlags};
use crate::logger::Logger;
use crate::models::{CheckDescriptor, CheckResult, Status};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

/// What to run: everything, one category, or one check by name.
#[derive(Debug, Clone)]
pub enum Selection {
    All,
    Category(String),
    Check(String),
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Category not found: {requested}. Available: {available}")]
    UnknownCategory { requested: String, available: String },
    #[error("Check not found: {requested}. Available: {available}")]
    UnknownCheck { requested: String, available: String },
    #[error("Unknown report format: {requested}. Available: {available}")]
    UnknownReportFormat { requested: String, available: String },
}

/// Distinct categories present in a set of checks, sorted.
pub fn categories(checks: &[CheckDescriptor]) -> BTreeSet<String> {
    checks.iter().map(|c| c.category.clone()).collect()
}

/// Narrow the discovered checks to the requested selection.
///
/// Category match is case-insensitive; unknown category or check name is a
/// usage error listing the valid options.
pub fn select(
    checks: &[CheckDescriptor],
    selection: &Selection,
) -> Result<Vec<CheckDescriptor>, UsageError> {
    match selection {
        Selection::All => Ok(checks.to_vec()),
        Selection::Category(cat) => {
            let wanted = cat.trim().to_lowercase();
            let matched: Vec<CheckDescriptor> = checks
                .iter()
                .filter(|c| c.category == wanted)
                .cloned()
                .collect();
            if matched.is_empty() {
                return Err(UsageError::UnknownCategory {
                    requested: cat.clone(),
                    available: categories(checks)
                        .into_iter()
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            Ok(matched)
        }
        Selection::Check(name) => {
            let matched: Vec<CheckDescriptor> = checks
                .iter()
                .filter(|c| &c.name == name)
                .cloned()
                .collect();
            if matched.is_empty() {
                return Err(UsageError::UnknownCheck {
                    requested: name.clone(),
                    available: checks
                        .iter()
                        .map(|c| c.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            Ok(matched)
        }
    }
}

/// Run the selected checks and return results sorted by script name.
///
/// Sequential mode executes strictly in the discovery order (sorted by name);
/// parallel mode fans out over rayon's pool, bounded by available
/// parallelism. Collection order across the pool is unspecified, hence the
/// final re-sort.
pub fn run(
    targets: &[CheckDescriptor],
    flags: &RunFlags,
    timeout: Duration,
    parallel: bool,
    logger: &Logger,
) -> Vec<CheckResult> {
    let mut results: Vec<CheckResult> = if parallel && targets.len() > 1 {
        targets
            .par_iter()
            .map(|d| executor::execute(d, flags, timeout))
            .collect()
    } else {
        targets
            .iter()
            .map(|d| {
                logger.debug(&format!("running {}", d.name));
                executor::execute(d, flags, timeout)
            })
            .collect()
    };
    results.sort_by(|a, b| a.script.cmp(&b.script));
    for r in results.iter().filter(|r| r.slow) {
        logger.note(&format!("slow check: {}", r.script));
    }
    results
}

/// Reduce results to the process exit code external CI depends on:
/// 2 if any ERROR, else 1 if any FAIL or TIMEOUT, else 0.
pub fn exit_code(results: &[CheckResult]) -> i32 {
    if results.iter().any(|r| r.status == Status::Error) {
        2
    } else if results.iter().any(|r| r.status.is_failure()) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::discover;
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

    fn mk_result(script: &str, status: Status) -> CheckResult {
        CheckResult {
            script: script.to_string(),
            category: "uncategorized".to_string(),
            status,
            output: String::new(),
            slow: false,
        }
    }

    fn descriptors() -> Vec<CheckDescriptor> {
        vec![
            CheckDescriptor {
                name: "a.sh".into(),
                category: "hygiene".into(),
                path: PathBuf::from("/opt/a.sh"),
            },
            CheckDescriptor {
                name: "b.sh".into(),
                category: "testing".into(),
                path: PathBuf::from("/opt/b.sh"),
            },
        ]
    }

    #[test]
    fn test_select_by_category_case_insensitive() {
        let checks = descriptors();
        let sel = select(&checks, &Selection::Category("Testing".into())).unwrap();
        assert_eq!(sel.len(), 1);
        assert_eq!(sel[0].name, "b.sh");
    }

    #[test]
    fn test_unknown_category_lists_valid_options() {
        let checks = descriptors();
        let err = select(&checks, &Selection::Category("nope".into())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("hygiene"));
        assert!(msg.contains("testing"));
    }

    #[test]
    fn test_unknown_check_lists_valid_options() {
        let checks = descriptors();
        let err = select(&checks, &Selection::Check("c.sh".into())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("c.sh"));
        assert!(msg.contains("a.sh"));
    }

    #[test]
    fn test_exit_code_monotonicity() {
        use Status::*;
        let code = |statuses: &[Status]| {
            let results: Vec<_> = statuses
                .iter()
                .enumerate()
                .map(|(i, s)| mk_result(&format!("{i}.sh"), *s))
                .collect();
            exit_code(&results)
        };
        assert_eq!(code(&[Pass, Fail, Pass]), 1);
        assert_eq!(code(&[Pass, Error, Fail]), 2);
        assert_eq!(code(&[Pass, Pass]), 0);
        assert_eq!(code(&[]), 0);
        assert_eq!(code(&[Pass, Timeout]), 1);
        assert_eq!(code(&[Timeout, Error]), 2);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = tempdir().unwrap();
        write_executable(dir.path(), "pass_one.sh", "#!/bin/sh\nexit 0\n");
        write_executable(dir.path(), "pass_two.sh", "#!/bin/sh\nexit 0\n");
        write_executable(dir.path(), "fail_one.sh", "#!/bin/sh\nexit 1\n");
        let checks = discover(dir.path(), "sh", &[], None);
        let logger = Logger::new(false, false);
        let flags = RunFlags::default();
        let seq = run(&checks, &flags, Duration::from_secs(30), false, &logger);
        let par = run(&checks, &flags, Duration::from_secs(30), true, &logger);
        let pairs = |rs: &[CheckResult]| {
            rs.iter()
                .map(|r| (r.script.clone(), r.status))
                .collect::<BTreeSet<_>>()
        };
        assert_eq!(pairs(&seq), pairs(&par));
        // Both modes render in sorted order.
        let names: Vec<_> = par.iter().map(|r| r.script.as_str()).collect();
        assert_eq!(names, vec!["fail_one.sh", "pass_one.sh", "pass_two.sh"]);
        assert_eq!(exit_code(&seq), 1);
    }
}
