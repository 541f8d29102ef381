//! Configuration for settlement engine

use crate::records::{OutputFormat, RecordsConfig};
use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger (balancing) configuration
    pub ledger: tally_ledger::Config,

    /// Input record configuration
    pub records: RecordsConfig,

    /// Output configuration
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format of transfer and balance records
    pub format: OutputFormat,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.ledger
            .apply_env()
            .map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Ok(format) = std::env::var("TALLY_OUTPUT_FORMAT") {
            self.output.format = format
                .parse()
                .map_err(|e| crate::Error::Config(format!("TALLY_OUTPUT_FORMAT: {}", e)))?;
        }

        if let Ok(prefix) = std::env::var("TALLY_COMMENT_PREFIX") {
            self.records.comment_prefix = prefix;
        }

        self.validate()
    }

    /// Check values that serde alone cannot
    pub fn validate(&self) -> crate::Result<()> {
        if self.records.comment_prefix.trim().is_empty() {
            return Err(crate::Error::Config(
                "records.comment_prefix must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
