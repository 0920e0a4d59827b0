use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_PREFIX: &str = "rollcall.log";

/// Installs a daily rolling file logger under `log_dir`.
///
/// Output goes to a file only; the terminal belongs to the TUI. The returned
/// guard flushes pending lines on drop and must outlive the program.
pub fn init(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok(guard)
}
