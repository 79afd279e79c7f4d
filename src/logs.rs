//! Startup logging
//!
//! Messages are filtered by the `STARTUP_VERBOSITY` level and written to
//! stdio, the startup log file, or both. The `run` and `run-and-enter`
//! modes own the container's stdio, so they log to both; every other
//! invocation leaves stdio to the command being executed and logs to the
//! file only.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const STARTUP_LOG: &str = "/var/log/container-startup.log";

/// Message severity; the numeric value matches `STARTUP_VERBOSITY`:
/// a message is emitted when its level is <= the configured verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error = 1,
    Warning = 2,
    Note = 3,
    Info = 4,
    Debug = 5,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

fn enabled(verbosity: u8, level: Level) -> bool {
    level as u8 <= verbosity
}

struct Logger {
    verbosity: u8,
    stdio: bool,
    file: Option<PathBuf>,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Whether the active logger writes to stdout/stderr. Callers use this
/// to decide if a diagnostic must additionally be printed directly for
/// the user to see it.
pub fn uses_stdio() -> bool {
    LOGGER.get().map(|logger| logger.stdio).unwrap_or(false)
}

/// Initialize the process-wide logger. Later calls are ignored.
pub fn init(use_stdio: bool, verbosity: u8) {
    let _ = LOGGER.set(Logger {
        verbosity,
        stdio: use_stdio,
        file: Some(PathBuf::from(STARTUP_LOG)),
    });
}

fn write(level: Level, message: &str) {
    let logger = match LOGGER.get() {
        Some(logger) => logger,
        None => {
            // Logging before init happens only for early config errors.
            if level == Level::Error {
                eprintln!("[error] {}", message);
            }
            return;
        }
    };

    if !enabled(logger.verbosity, level) {
        return;
    }

    if logger.stdio {
        if level == Level::Error {
            eprintln!("[{}] {}", level.tag(), message);
        } else {
            println!("[{}] {}", level.tag(), message);
        }
    }

    if let Some(path) = &logger.file {
        // The log file is best effort; a read-only /var/log must not
        // break container boot.
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "{} [{}] {}", timestamp, level.tag(), message);
        }
    }
}

pub fn error(message: impl AsRef<str>) {
    write(Level::Error, message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    write(Level::Warning, message.as_ref());
}

pub fn note(message: impl AsRef<str>) {
    write(Level::Note, message.as_ref());
}

pub fn info(message: impl AsRef<str>) {
    write(Level::Info, message.as_ref());
}

pub fn debug(message: impl AsRef<str>) {
    write(Level::Debug, message.as_ref());
}
