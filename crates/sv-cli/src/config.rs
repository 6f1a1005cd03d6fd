//! Configuration loading for the Sigview CLI.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token; the `SIGVIEW_TOKEN` environment variable overrides
    /// this.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum automatic retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Default page size for list commands.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_page_size() -> u32 {
    25
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            page_size: default_page_size(),
            logging: LoggingSection::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns a copy with the token redacted for display.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();
        if config.token.is_some() {
            config.token = Some("***REDACTED***".to_string());
        }
        config
    }
}

/// Logging section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level name (error, warn, info, debug, trace).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
