//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/counsel/config.toml).

use crate::paths::CounselPaths;
use counsel_core::config::RootConfig;
use counsel_core::error::{CounselError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file is not an error: the defaults apply until the user writes
/// one.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(CounselPaths::config_file()?))
    }

    /// Creates a ConfigService reading from an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// Parse failures are reported once and the defaults are used instead.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("[Config] Falling back to defaults: {}", e);
            RootConfig::default()
        });

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());

        loaded
    }

    /// Reads and parses the config file without touching the cache.
    pub fn load(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!("[Config] No config file at {:?}, using defaults", self.path);
            return Ok(RootConfig::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CounselError::io(format!(
                "Failed to read config file at {:?}: {}",
                self.path, e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }
}
