//! Explicit logger handle with colored level prefixes.
//!
//! Constructed once in `main` and passed by reference to components that
//! report progress. Color is suppressed under `NO_COLOR` or for json output.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    debug: bool,
    color: bool,
}

impl Logger {
    pub fn new(debug: bool, color: bool) -> Self {
        let color = color && std::env::var_os("NO_COLOR").is_none();
        Logger { debug, color }
    }

    pub fn info(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", "info:".blue().bold(), msg);
        } else {
            eprintln!("info: {}", msg);
        }
    }

    pub fn note(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", "note:".yellow().bold(), msg);
        } else {
            eprintln!("note: {}", msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", "error:".red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn debug(&self, msg: &str) {
        if !self.debug {
            return;
        }
        if self.color {
            eprintln!("{} {}", "debug:".bright_black(), msg);
        } else {
            eprintln!("debug: {}", msg);
        }
    }
}
