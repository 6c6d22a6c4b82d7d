//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "APIDESK_LOG";

/// Log file used while the TUI owns the terminal.
pub const LOG_FILE: &str = "apidesk.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// `<apidesk dir>/apidesk.log`, so the TUI screen stays clean.
    File,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Cannot open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install logger: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter from `APIDESK_LOG`, falling back to `default_level`.
pub fn build_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| LoggingError::Filter(e.to_string()))
}

/// Install the global subscriber.
pub fn setup_logging(target: LogTarget, apidesk_dir: &Path) -> Result<(), LoggingError> {
    let filter = build_filter("warn")?;

    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        // The directory is not created here; `apidesk init` owns it.
        LogTarget::File => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(apidesk_dir.join(LOG_FILE))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?;
        }
    }

    Ok(())
}
