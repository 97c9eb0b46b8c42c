//! Minimal [`log`] backend for Koala binaries.
//!
//! Libraries only emit records through the `log` macros; a binary calls
//! [`init`] once to see them on stderr.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use owo_colors::OwoColorize;

/// Writes `[Koala <target>] LEVEL message` lines to stderr.
struct TerminalLogger {
    max_level: LevelFilter,
}

impl Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().to_string(),
            Level::Warn => "WARN".yellow().to_string(),
            Level::Info => "INFO".green().to_string(),
            Level::Debug => "DEBUG".blue().to_string(),
            Level::Trace => "TRACE".dimmed().to_string(),
        };
        eprintln!("[Koala {}] {level} {}", record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Map a `-v` count to a level filter.
///
/// Zero shows warnings only, each extra `-v` widens by one level.
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the terminal logger as the global `log` backend.
///
/// # Errors
///
/// Fails if another logger was installed first.
pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(TerminalLogger { max_level }))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }
}
