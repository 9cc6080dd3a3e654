//! Logging configuration for doc-analytics.
//!
//! Writes to a file in TUI mode (so log lines never land on the alternate
//! screen) and to stderr in headless mode.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Directory and file stem used for the log file.
const LOG_DIR_NAME: &str = "doc-analytics";
const LOG_FILE_NAME: &str = "doc-analytics.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging for TUI mode.
///
/// Location: `~/.local/state/doc-analytics/doc-analytics.log` on Linux,
/// or the platform-appropriate state/config directory elsewhere.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    // Truncate on each run
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .try_init();
}

/// Initializes logging for headless mode.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Returns the path for the log file.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME);
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME);
    }

    std::env::temp_dir().join(LOG_FILE_NAME)
}
