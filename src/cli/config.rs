//! Configuration file handling
//!
//! The config is a single JSON object. Only `data_dir` and `administrator`
//! are required; everything else has a default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// Name of the audit log inside the data directory
pub const AUDIT_LOG_FILE: &str = "audit.log";

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Initial administrator, used by `init` (required)
    pub administrator: String,

    /// Append an audit record per mutation attempt (default true)
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Persist a snapshot after every successful mutation (default true)
    #[serde(default = "default_true")]
    pub snapshot_on_write: bool,

    /// Minimum log severity (default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP adapter settings
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if self.administrator.trim().is_empty() {
            return Err(CliError::config_error("administrator must not be empty"));
        }
        self.severity()?;
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn audit_path(&self) -> std::path::PathBuf {
        self.data_path().join(AUDIT_LOG_FILE)
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }
}
