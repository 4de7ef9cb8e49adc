//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use usdm_exchange::DEFAULT_BASE_URL;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// REST endpoint for the futures API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the sqlite database file.
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_database() -> String {
    "data/usdm.db".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            database: default_database(),
        }
    }
}

impl BotConfig {
    /// Load from `path` when the file exists, otherwise fall back to
    /// defaults.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
