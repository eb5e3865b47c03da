//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rulerun",
    version,
    about = "Run repository rule checks",
    long_about = "rulerun — discover and run repository rule checks as isolated subprocesses.\n\nChecks are standalone executables under the checks directory; exit code 0 means PASS.\nAggregate exit codes: 0 all passed, 1 at least one FAIL/TIMEOUT, 2 at least one internal ERROR.",
    after_help = "Examples:\n  rulerun run\n  rulerun run --category hygiene --parallel\n  rulerun run --check check_file_length.sh --report markdown\n  rulerun list --categories\n  rulerun suppressions --days 7",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for running, listing, and auditing checks.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current rulerun version.")]
    Version,
    /// Run all or selected checks
    #[command(
        about = "Run checks",
        long_about = "Discover checks and run them sequentially or on a worker pool. The report is always printed before a nonzero exit.",
        after_help = "Examples:\n  rulerun run --parallel\n  rulerun run --category testing --report plain\n  rulerun run --check check_docstrings.sh --debug"
    )]
    Run {
        #[arg(long, help = "Run only checks in this category (case-insensitive)", conflicts_with = "check")]
        category: Option<String>,
        #[arg(long, help = "Run a single check by exact name")]
        check: Option<String>,
        #[arg(long, help = "Report format: table|markdown|plain|json (default: table)")]
        report: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Run checks on a worker pool instead of sequentially")]
        parallel: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Forward --autofix to child checks")]
        autofix: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Forward --dry-run to child checks")]
        dry_run: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Enable debug logging and forward --debug to child checks")]
        debug: bool,
        #[arg(long, help = "Hard per-check timeout in seconds (default: 180)")]
        timeout: Option<u64>,
        #[arg(long, help = "Checks directory (default: checks)")]
        checks_dir: Option<String>,
        #[arg(long, help = "Plugin directory (default: <checks-dir>/plugins)")]
        plugin_dir: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// List available checks and categories without running anything
    #[command(
        about = "List checks and categories",
        long_about = "Print the discovered categories and check names; nothing is executed."
    )]
    List {
        #[arg(long, action = clap::ArgAction::SetTrue, help = "List only categories")]
        categories: bool,
        #[arg(long, help = "Checks directory (default: checks)")]
        checks_dir: Option<String>,
        #[arg(long, help = "Plugin directory (default: <checks-dir>/plugins)")]
        plugin_dir: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Enable debug logging")]
        debug: bool,
    },
    /// Audit suppression expiry dates from .rulerun.yaml
    #[command(
        about = "Audit rule suppressions",
        long_about = "List suppressed rules with their reasons, flagging expired entries and entries due for review soon. Optionally notifies Slack or opens a GitHub issue.",
        after_help = "Examples:\n  rulerun suppressions\n  rulerun suppressions --days 14 --slack"
    )]
    Suppressions {
        #[arg(long, help = "Review horizon in days for due-soon entries (default: 7)")]
        days: Option<u32>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Notify via Slack webhook (SLACK_WEBHOOK_URL)")]
        slack: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Open a GitHub issue (GITHUB_REPOSITORY, GITHUB_TOKEN)")]
        github: bool,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Enable debug logging")]
        debug: bool,
    },
}
