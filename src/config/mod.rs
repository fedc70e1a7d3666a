//! Configuration management for the training core.
//!
//! Configuration is a small TOML file covering the pieces an operator may
//! reasonably want to change per deployment: where the progress store lives,
//! logging verbosity, and the defaults stamped onto a freshly created
//! profile. Gameplay numbers (penalties, timers, thresholds) are deliberately
//! *not* configuration — they live as named constants in [`tuning`] so every
//! installation scores the same way.
//!
//! ## File format
//!
//! ```toml
//! [academy]
//! default_name = "New Employee"
//! default_position = "Sales Consultant"
//! default_store = "Chelyabinsk"
//!
//! [storage]
//! data_dir = "data"
//!
//! [logging]
//! level = "info"
//! ```

pub mod tuning;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Defaults applied when a new profile is created at first login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademyConfig {
    #[serde(default = "default_name")]
    pub default_name: String,
    #[serde(default = "default_position")]
    pub default_position: String,
    #[serde(default = "default_store")]
    pub default_store: String,
}

fn default_name() -> String {
    "New Employee".to_string()
}

fn default_position() -> String {
    "Sales Consultant".to_string()
}

fn default_store() -> String {
    "Chelyabinsk".to_string()
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            default_name: default_name(),
            default_position: default_position(),
            default_store: default_store(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub academy: AcademyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub async fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Write a starter configuration file with defaults.
    pub async fn create_default(path: &str) -> Result<()> {
        Config::default().save(path).await
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir cannot be empty"));
        }
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            other => {
                return Err(anyhow!(
                    "logging.level must be one of error/warn/info/debug/trace, got '{}'",
                    other
                ))
            }
        }
        if self.academy.default_name.trim().is_empty() {
            return Err(anyhow!("academy.default_name cannot be empty"));
        }
        Ok(())
    }
}
