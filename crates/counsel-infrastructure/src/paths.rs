//! Unified path management for counsel configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/counsel/           # Config directory
//! ├── config.toml              # Client configuration
//! └── logs/                    # Application logs
//!     └── counsel.log.YYYY-MM-DD
//! ```

use counsel_core::error::{CounselError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "counsel";

/// Unified path management for counsel.
pub struct CounselPaths;

impl CounselPaths {
    /// Returns the counsel configuration directory (e.g. `~/.config/counsel/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| CounselError::config("Cannot find config directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory log files are written to.
    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }

    /// Default log file path.
    pub fn default_log_file() -> Result<PathBuf> {
        Ok(Self::log_dir()?.join("counsel.log"))
    }
}
