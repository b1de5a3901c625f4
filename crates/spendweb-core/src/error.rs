//! Error types for spendweb-core
//!
//! Errors carry a stable code, a severity and optional suggestions so the
//! presentation layer can show them without matching on variants.

use serde::{Deserialize, Serialize};
use spendweb_provider::ProviderError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Rejected user input, no fetch was made
    ValidationError,
    /// Requested page lies beyond the data
    InvalidPage,
    /// Employee not found
    EmployeeNotFound,
    /// Transaction not found
    TransactionNotFound,
    /// A store fetch returned no result
    FetchFailed,
    /// Malformed provider data
    DataError,
    /// Another page request is still running
    Busy,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidPage => write!(f, "INVALID_PAGE"),
            ErrorCode::EmployeeNotFound => write!(f, "EMPLOYEE_NOT_FOUND"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::DataError => write!(f, "DATA_ERROR"),
            ErrorCode::Busy => write!(f, "BUSY"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
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

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - the user action was refused
    Warning,
    /// Error - the user action failed
    Error,
}

impl ErrorSeverity {
    /// Level the default logger writes at
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for spendweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid page {page}")]
    InvalidPage { page: usize },

    #[error("Employee not found: {id}")]
    EmployeeNotFound { id: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Fetch failed: {key}")]
    FetchFailed { key: String },

    #[error("Data error: {message}")]
    DataError { message: String },

    #[error("A page change is already in progress")]
    Busy,
}

impl CoreError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InvalidPage { .. } => ErrorCode::InvalidPage,
            CoreError::EmployeeNotFound { .. } => ErrorCode::EmployeeNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::FetchFailed { .. } => ErrorCode::FetchFailed,
            CoreError::DataError { .. } => ErrorCode::DataError,
            CoreError::Busy => ErrorCode::Busy,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::InvalidPage { .. } => ErrorSeverity::Warning,
            CoreError::EmployeeNotFound { .. } => ErrorSeverity::Info,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::FetchFailed { .. } => ErrorSeverity::Error,
            CoreError::DataError { .. } => ErrorSeverity::Error,
            CoreError::Busy => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ValidationError { message } => {
                details = details
                    .with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::InvalidPage { page } => {
                details = details.with_detail(serde_json::json!({ "page": page }));
                details = details.with_suggestion(
                    "Go back to the first page or choose a larger page size.".to_string(),
                );
            }
            CoreError::EmployeeNotFound { .. } => {
                details = details.with_suggestion(
                    "Use the /api/employees endpoint to list all employees.".to_string(),
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "Reload the transaction list; the row may be stale.".to_string(),
                );
            }
            CoreError::FetchFailed { key } => {
                details = details.with_detail(serde_json::json!({ "request": key }));
                details = details.with_suggestion(
                    "The previous page is still shown. Try again.".to_string(),
                );
            }
            CoreError::Busy => {
                details = details
                    .with_suggestion("Wait for the current page to finish loading.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ProviderError> for CoreError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidPage { page } => CoreError::InvalidPage { page },
            ProviderError::InvalidPageSize { page_size } => CoreError::ValidationError {
                message: format!("Page size {} is not allowed", page_size),
            },
            ProviderError::EmptyEmployeeId => CoreError::ValidationError {
                message: "Employee id cannot be empty".to_string(),
            },
            ProviderError::EmployeeNotFound { id } => CoreError::EmployeeNotFound { id },
            ProviderError::TransactionNotFound { id } => CoreError::TransactionNotFound { id },
            ProviderError::Io(e) => CoreError::DataError {
                message: e.to_string(),
            },
            ProviderError::InvalidData { message } => CoreError::DataError { message },
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log a failed operation
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a refused operation
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let severity = error.severity();
        log::log!(
            target: "spendweb::error",
            severity.log_level(),
            "{} [{}] {} - Operation: {} - Data: {}",
            severity.to_string().to_uppercase(),
            error.code(),
            error,
            context.operation,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "spendweb::error",
            "WARNING: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================
