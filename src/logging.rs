//! Verbose diagnostics and status-line text for the Cura client.
//!
//! The TUI owns the terminal, so diagnostics go to stderr and are gated
//! behind the `--verbose` flag. Backend failures additionally surface on
//! the status line through [`failure`].

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::palette;

static VERBOSE: AtomicBool = AtomicBool::new(false);

enum Level {
    Info,
    Warn,
}

impl Level {
    fn tag(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warn => "warn",
        }
    }

    fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Level::Info => palette::TEAL_RGB,
            Level::Warn => palette::ORANGE_RGB,
        }
    }
}

/// Enable or disable verbose logging output.
pub fn set_verbose(enabled: bool) {
    VERBOSE.store(enabled, Ordering::SeqCst);
}

/// Check whether verbose logging is enabled.
#[must_use]
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

fn emit(level: Level, message: &str) {
    if is_verbose() {
        let (r, g, b) = level.rgb();
        eprintln!("{} {}", level.tag().truecolor(r, g, b).bold(), message);
    }
}

/// Emit a verbose info message (no-op when verbosity is disabled).
pub fn info(message: impl AsRef<str>) {
    emit(Level::Info, message.as_ref());
}

/// Emit a verbose warning message (no-op when verbosity is disabled).
pub fn warn(message: impl AsRef<str>) {
    emit(Level::Warn, message.as_ref());
}

/// Status-line text for a failed backend action, e.g.
/// `failure("load calendars", &err)` renders " Failed to load calendars:
/// <err>". Also logged as a warning so `--verbose` keeps a stderr trail
/// of what the status line showed.
pub fn failure(action: &str, err: &impl Display) -> String {
    let message = format!("Failed to {action}: {err}");
    emit(Level::Warn, &message);
    format!(" {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_formats_the_status_line() {
        let text = failure("load calendars", &"connection refused");
        assert_eq!(text, " Failed to load calendars: connection refused");
    }
}
