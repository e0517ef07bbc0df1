//! Diagnostic logging. Channel churn, poll failures and malformed payloads are
//! recorded here and never shown to the operator.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SCAPE_LOG";
pub const TUI_LOG_FILE: &str = "scape-console.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Plain subcommands share the terminal with their own output.
    Stderr,
    /// The TUI owns the terminal, so diagnostics go to a file.
    File,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Installing twice is harmless; the first
/// subscriber stays.
pub fn init(target: LogTarget) -> std::io::Result<()> {
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File => {
            let file = open_log_file(Path::new(TUI_LOG_FILE))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
