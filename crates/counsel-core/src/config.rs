//! Client configuration model.
//!
//! Mirrors `~/.config/counsel/config.toml`. Every section is optional in the
//! file; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub datastore: DatastoreSettings,
    #[serde(default)]
    pub user: Option<UserSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the chat backend lives.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BackendSettings {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

/// Which datastore implementation backs conversations and messages.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatastoreKind {
    /// Supabase-style PostgREST endpoint
    #[default]
    Postgrest,
    /// Process-local store; nothing survives a restart
    Memory,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct DatastoreSettings {
    #[serde(default)]
    pub kind: DatastoreKind,
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: Option<String>,
    /// Public (anon) API key sent as `apikey`
    #[serde(default)]
    pub api_key: Option<String>,
    /// User access token; the API key is used as bearer when absent
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSettings {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file; defaults to `<config dir>/logs/counsel.log`
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
