//! Configuration management for `local-notify`.
//!
//! Settings are loaded from a TOML file; command-line flags are applied on
//! top and the merged result is validated before use.

use crate::cli::CliArgs;
use local_notification::{ClientConfig, Platform};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Notification client settings
    #[serde(default)]
    pub notification: ClientConfig,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration; nothing is written to disk.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded or default configuration, or an error if the file could not be read or parsed.
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("📄 No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the file settings
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> anyhow::Result<()> {
        if let Some(platform) = &args.platform {
            self.notification.platform = Some(platform.parse::<Platform>()?);
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }

        if args.json_logs {
            self.logging.json_format = true;
        }

        Ok(())
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LEVELS:?}",
                &self.logging.level
            ));
        }

        self.notification.validate().map_err(|e| e.to_string())
    }
}
