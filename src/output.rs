//! Report rendering for check runs.
//!
//! Supports `table` (default), `markdown`, `plain`, and `json`. The summary
//! table is always printed before any nonzero exit, and the full captured
//! output of every non-PASS result follows it so failures are diagnosable
//! without re-running.

use crate::models::{CheckResult, RunSummary, Status};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

pub const REPORT_FORMATS: &[&str] = &["table", "markdown", "plain", "json"];

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn status_cell(r: &CheckResult) -> String {
    if r.slow {
        format!("{} (slow)", r.status)
    } else {
        r.status.to_string()
    }
}

fn colorize_status(status: Status, cell: &str) -> String {
    match status {
        Status::Pass => cell.green().to_string(),
        Status::Fail => cell.red().to_string(),
        Status::Timeout => cell.yellow().to_string(),
        Status::Error => cell.red().bold().to_string(),
    }
}

/// Render the aligned three-column table (pure, for testing).
pub fn render_table(results: &[CheckResult], color: bool) -> String {
    let headers = ["Script", "Category", "Status"];
    let rows: Vec<[String; 3]> = results
        .iter()
        .map(|r| [r.script.clone(), r.category.clone(), status_cell(r)])
        .collect();
    let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    let mut out = String::new();
    out.push_str(&format!(
        "| {:w0$} | {:w1$} | {:w2$} |\n",
        headers[0],
        headers[1],
        headers[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    ));
    out.push_str(&format!(
        "|{}|{}|{}|\n",
        "-".repeat(widths[0] + 2),
        "-".repeat(widths[1] + 2),
        "-".repeat(widths[2] + 2)
    ));
    for (row, r) in rows.iter().zip(results.iter()) {
        let status = format!("{:w$}", row[2], w = widths[2]);
        let status = if color {
            colorize_status(r.status, &status)
        } else {
            status
        };
        out.push_str(&format!(
            "| {:w0$} | {:w1$} | {} |\n",
            row[0],
            row[1],
            status,
            w0 = widths[0],
            w1 = widths[1]
        ));
    }
    out
}

/// Render the unpadded markdown pipe table (pure, for testing).
pub fn render_markdown(results: &[CheckResult]) -> String {
    let mut out = String::from("| Script | Category | Status |\n| --- | --- | --- |\n");
    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            r.script,
            r.category,
            status_cell(r)
        ));
    }
    out
}

/// Compose the json report object (pure, for testing).
pub fn compose_report_json(results: &[CheckResult]) -> JsonVal {
    json!({
        "results": results,
        "summary": RunSummary::from_results(results),
    })
}

/// Print the summary report in the requested format.
pub fn print_report(results: &[CheckResult], format: &str) {
    match format {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_report_json(results))
                .unwrap_or_else(|_| "{}".to_string())
        ),
        "markdown" => print!("{}", render_markdown(results)),
        "plain" => {
            let color = use_colors(format);
            for r in results {
                let cell = status_cell(r);
                let cell = if color {
                    colorize_status(r.status, &cell)
                } else {
                    cell
                };
                println!("{} [{}]: {}", r.script, r.category, cell);
            }
        }
        _ => print!("{}", render_table(results, use_colors(format))),
    }
}

/// Print the full captured output of every non-PASS result.
pub fn print_failures(results: &[CheckResult], format: &str) {
    if format == "json" {
        // The json report already carries every result's output.
        return;
    }
    let color = use_colors(format);
    for r in results.iter().filter(|r| r.status != Status::Pass) {
        let header = format!("--- {} [{}] {} ---", r.script, r.category, r.status);
        if color {
            println!("\n{}\n{}", header.bold(), r.output);
        } else {
            println!("\n{}\n{}", header, r.output);
        }
    }
}
