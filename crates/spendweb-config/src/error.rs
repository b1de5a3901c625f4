//! Error types for spendweb-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    /// File not found
    FileNotFound,
    /// Invalid YAML format
    InvalidYaml,
    /// Invalid field value
    InvalidValue,
    /// IO error
    IoError,
    /// Validation error
    ValidationError,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ConfigErrorCode::InvalidYaml => write!(f, "INVALID_YAML"),
            ConfigErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ConfigErrorCode::IoError => write!(f, "IO_ERROR"),
            ConfigErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
        }
    }
}

/// Detailed error information, printed when startup fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConfigErrorDetails {
    pub fn new(code: ConfigErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigErrorSeverity {
    Warning,
    Error,
}

impl std::fmt::Display for ConfigErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorSeverity::Warning => write!(f, "warning"),
            ConfigErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML format: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error occurred")]
    IoError,

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// Get the error code
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::IoError => ConfigErrorCode::IoError,
            ConfigError::ValidationError { .. } => ConfigErrorCode::ValidationError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ConfigErrorSeverity {
        match self {
            ConfigError::ValidationError { .. } => ConfigErrorSeverity::Warning,
            _ => ConfigErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ConfigErrorDetails {
        let mut details = ConfigErrorDetails::new(self.code(), self.to_string());

        match self {
            ConfigError::FileNotFound { .. } => {
                details = details.with_suggestion(
                    "Use --config flag to specify the config file path.".to_string(),
                );
            }
            ConfigError::InvalidYaml { .. } => {
                details = details.with_suggestion(
                    "Compare your file against templates/default_config.yaml.".to_string(),
                );
            }
            ConfigError::InvalidValue { field, reason } => {
                details = details.with_field(field.clone());
                details = details.with_suggestion(reason.clone());
            }
            ConfigError::ValidationError { message } => {
                details = details.with_suggestion(message.clone());
            }
            ConfigError::IoError => {}
        }

        details
    }

    /// Severity tag followed by the details, as printed when startup fails
    pub fn report(&self) -> String {
        format!(
            "[{}] {}",
            self.severity().to_string().to_uppercase(),
            self.to_details()
        )
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
