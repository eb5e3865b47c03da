//! rulerun CLI binary entry point.
//! Delegates to modules for discovery/execution/reporting and maps results
//! to the aggregate exit code.

mod cli;
mod config;
mod executor;
mod logger;
mod models;
mod notify;
mod output;
mod registry;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use executor::RunFlags;
use logger::Logger;
use notify::Notifier;
use registry::{CheckSource, ScanSource};
use runner::{Selection, UsageError};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CHECKS_DIR: &str = "checks";
const CHECK_EXTENSION: &str = "sh";

fn build_source(
    repo_root: Option<&str>,
    checks_dir: Option<&str>,
    plugin_dir: Option<&str>,
) -> ScanSource {
    let root = PathBuf::from(repo_root.unwrap_or("."));
    let checks = root.join(checks_dir.unwrap_or(DEFAULT_CHECKS_DIR));
    let plugins = plugin_dir
        .map(|p| root.join(p))
        .unwrap_or_else(|| checks.join("plugins"));
    ScanSource::new(checks, CHECK_EXTENSION, Vec::new(), Some(plugins))
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Run {
            category,
            check,
            report,
            parallel,
            autofix,
            dry_run,
            debug,
            timeout,
            checks_dir,
            plugin_dir,
            repo_root,
        } => {
            let report = report.unwrap_or_else(|| "table".to_string());
            let logger = Logger::new(debug, report != "json");
            if !output::REPORT_FORMATS.contains(&report.as_str()) {
                let err = UsageError::UnknownReportFormat {
                    requested: report,
                    available: output::REPORT_FORMATS.join(", "),
                };
                logger.error(&err.to_string());
                std::process::exit(2);
            }
            let source = build_source(
                repo_root.as_deref(),
                checks_dir.as_deref(),
                plugin_dir.as_deref(),
            );
            let checks = source.checks();
            if checks.is_empty() {
                logger.note("No checks discovered; nothing to run.");
            }
            let selection = if let Some(name) = check {
                Selection::Check(name)
            } else if let Some(cat) = category {
                Selection::Category(cat)
            } else {
                Selection::All
            };
            let targets = match runner::select(&checks, &selection) {
                Ok(t) => t,
                Err(e) => {
                    logger.error(&e.to_string());
                    std::process::exit(2);
                }
            };
            let flags = RunFlags {
                debug,
                autofix,
                dry_run,
            };
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or(executor::DEFAULT_TIMEOUT);
            let results = runner::run(&targets, &flags, timeout, parallel, &logger);
            output::print_report(&results, &report);
            output::print_failures(&results, &report);
            std::process::exit(runner::exit_code(&results));
        }
        Commands::List {
            categories,
            checks_dir,
            plugin_dir,
            repo_root,
            debug,
        } => {
            let logger = Logger::new(debug, true);
            let source = build_source(
                repo_root.as_deref(),
                checks_dir.as_deref(),
                plugin_dir.as_deref(),
            );
            let checks = source.checks();
            if checks.is_empty() {
                logger.note("No checks discovered.");
            }
            println!("Available categories:");
            for cat in runner::categories(&checks) {
                println!("  {}", cat);
            }
            if !categories {
                println!("\nAvailable checks:");
                for check in &checks {
                    println!("  {} [{}]", check.name, check.category);
                }
            }
        }
        Commands::Suppressions {
            days,
            slack,
            github,
            repo_root,
            debug,
        } => {
            let logger = Logger::new(debug, true);
            let root = PathBuf::from(repo_root.as_deref().unwrap_or("."));
            let cfg = match config::load_config(&root) {
                Ok(c) => c,
                Err(e) => {
                    logger.error(&e.to_string());
                    std::process::exit(2);
                }
            };
            if cfg.suppressed_rules.is_empty() {
                logger.note("No suppressed rules configured.");
                return;
            }
            let today = config::IsoDate::today();
            let horizon = days.unwrap_or(7);
            let expired = config::expired(&cfg, today);
            let due = config::due_within(&cfg, today, horizon);
            let mut lines: Vec<String> = Vec::new();
            if !expired.is_empty() {
                lines.push("Rule suppressions expired:".to_string());
                for (rule, sup) in &expired {
                    lines.push(format!("- {}: {}", rule, sup.reason));
                }
            }
            if !due.is_empty() {
                lines.push(format!(
                    "Rule suppressions due for review within {} days:",
                    horizon
                ));
                for (rule, sup) in &due {
                    lines.push(format!("- {}: {}", rule, sup.reason));
                }
            }
            if lines.is_empty() {
                println!("All {} suppression(s) are current.", cfg.suppressed_rules.len());
                return;
            }
            let message = lines.join("\n");
            println!("{}", message);
            if slack {
                match notify::SlackWebhook::from_env(logger) {
                    Some(n) => {
                        n.notify("Rule suppression review", &message);
                    }
                    None => logger.error("SLACK_WEBHOOK_URL not set."),
                }
            }
            if github {
                match notify::GithubIssues::from_env(logger) {
                    Some(n) => {
                        n.notify("Rule suppression review", &message);
                    }
                    None => logger.error("GITHUB_REPOSITORY and GITHUB_TOKEN must be set."),
                }
            }
        }
    }
}
