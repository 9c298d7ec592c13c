//! Tracing subscriber setup.
//!
//! `serve` and `ask` log to stderr. The prompt owns its terminal, so it logs
//! to a file in the temp directory instead.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable with the log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "FOLLOWUP_LOG";

/// Name of the prompt log file inside the temp directory.
pub const PROMPT_LOG_FILE: &str = "followup-prompt.log";

fn log_filter() -> EnvFilter {
    let level = env::var(LOG_ENV)
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Logs to stderr; stdout stays free for results and protocol frames.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(io::stderr)
        .try_init();
}

pub fn prompt_log_path() -> PathBuf {
    env::temp_dir().join(PROMPT_LOG_FILE)
}

/// Logs to the prompt log file. Keep the guard alive until the command ends.
///
/// # Errors
/// Returns an error if the log file cannot be opened.
pub fn init_prompt_file() -> Result<WorkerGuard> {
    let path = prompt_log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}
