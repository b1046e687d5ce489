//! Log setup for the terminal client.
//!
//! Logs go to a file so they never interleave with the REPL output.

use anyhow::{Context, Result};
use counsel_core::config::LoggingSettings;
use counsel_infrastructure::paths::CounselPaths;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Resolves the log file: the configured one, else the default under the config dir.
pub fn log_file(settings: &LoggingSettings) -> Result<PathBuf> {
    match &settings.file {
        Some(file) => Ok(file.clone()),
        None => Ok(CounselPaths::default_log_file()?),
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new(counsel_core::config::DEFAULT_LOG_LEVEL))
}

/// Installs the global subscriber and returns the file it writes to.
pub fn init(settings: &LoggingSettings) -> Result<PathBuf> {
    let path = log_file(settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(path)
}
