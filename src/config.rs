//! Configuration file
//!
//! ```json
//! {"schema_dir": "./schemas", "log_level": "warn", "strict_removals": true}
//! ```
//!
//! Only `schema_dir` is required.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding type declaration files (required)
    pub schema_dir: PathBuf,

    /// Lowest log severity written (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reject removal of fields no ancestor declares (optional, default true)
    #[serde(default = "default_strict_removals")]
    pub strict_removals: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_strict_removals() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        // Relative schema directories resolve against the config file's location
        if config.schema_dir.is_relative() {
            if let Some(parent) = path.parent() {
                return Ok(Self {
                    schema_dir: parent.join(&config.schema_dir),
                    ..config
                });
            }
        }

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("schema_dir must not be empty".into()));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(ConfigError::Invalid)
    }
}
