//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::infrastructure::traits::Reporter;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Reporter writing info lines to stdout and errors to stderr.
///
/// Messages that already carry a `fatal:` prefix keep it, colored; others get `error:`.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn info(&self, msg: &str) {
        info(msg);
    }

    fn error(&self, msg: &str) {
        match msg.strip_prefix("fatal: ") {
            Some(rest) => eprintln!("{}: {}", "fatal".red().bold(), rest),
            None => error(msg),
        }
    }
}
