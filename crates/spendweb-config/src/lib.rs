//! Configuration management for spendweb
//!
//! This module handles loading, validation, and management of
//! spendweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Data source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the mock data file
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Mock data file name (JSON with `employees` and `transactions`)
    #[serde(default = "default_mock_file")]
    pub mock_file: String,
    /// Simulated latency for every provider call, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            mock_file: default_mock_file(),
            latency_ms: 0,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_mock_file() -> String {
    "mock-data.json".to_string()
}

const MAX_LATENCY_MS: u64 = 10_000;

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used until the user submits another one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data source settings
    #[serde(default)]
    pub data: DataConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.default_page_size < 1 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".to_string(),
                reason: "Page size must be at least 1".to_string(),
            });
        }

        if self.data.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::InvalidValue {
                field: "data.latency_ms".to_string(),
                reason: format!("Latency must be at most {} ms", MAX_LATENCY_MS),
            });
        }

        if self.data.mock_file.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "data.mock_file must name a JSON file".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the full path to the mock data file
    pub fn mock_data_path(&self) -> PathBuf {
        self.data.path.join(&self.data.mock_file)
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
