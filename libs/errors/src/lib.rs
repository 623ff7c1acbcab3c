//! Shared error vocabulary for SmartCane services
//!
//! Services keep their own domain error enums and plug into the shared
//! interface by implementing [`CaneErrorTrait`]. Infrastructure code in the
//! shared libraries reports failures through [`CaneError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ErrorInfo - API error response type
// ============================================================================

/// Standard error information for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (HTTP status)
    pub code: u16,
    /// Error message
    pub message: String,
}

impl ErrorInfo {
    /// Create a new ErrorInfo with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }
}

// ============================================================================
// CaneError - infrastructure errors raised by shared code
// ============================================================================

/// Error type for the shared libraries (bootstrap, logging, storage setup)
#[derive(Debug, Error)]
pub enum CaneError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Service startup failed: {0}")]
    StartupFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using CaneError
pub type CaneResult<T> = Result<T, CaneError>;

impl CaneErrorTrait for CaneError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Logging(_) => "LOGGING_ERROR",
            Self::StartupFailed(_) => "STARTUP_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Database(_) | Self::Sqlite(_) => ErrorCategory::Database,
            Self::Io(_) | Self::Logging(_) | Self::StartupFailed(_) | Self::Internal(_) => {
                ErrorCategory::Internal
            },
        }
    }
}

// ============================================================================
// Error capability trait
// ============================================================================

/// Error category enum - used for classification and HTTP mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Database,

    // Business logic layer
    Validation,
    NotFound,
    Conflict,
    PayloadTooLarge,

    // External provider (SMS carrier)
    Provider,

    // System level
    Internal,
}

/// Capability trait shared by every service error type
///
/// A service keeps its own domain enum (e.g. `AlertSrvError`) and gains the
/// common outward interface (codes, categories, status mapping) by
/// implementing the two required methods.
pub trait CaneErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for API, logs, monitoring)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Whether the error text is safe to show to API clients
    fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Validation
                | ErrorCategory::NotFound
                | ErrorCategory::Conflict
                | ErrorCategory::PayloadTooLarge
        )
    }

    /// Numeric HTTP status for this error
    fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 422,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::PayloadTooLarge => 413,
            ErrorCategory::Provider => 502,
            ErrorCategory::Configuration | ErrorCategory::Database | ErrorCategory::Internal => 500,
        }
    }

    /// Convert to HTTP status code
    #[cfg(feature = "axum-support")]
    fn http_status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Build the API payload; server-side failures are masked
    fn to_error_info(&self) -> ErrorInfo {
        let code = self.status_code();
        if self.is_client_error() {
            ErrorInfo::new(self.to_string()).with_code(code)
        } else {
            ErrorInfo::new("Internal server error").with_code(code)
        }
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Database | ErrorCategory::Configuration => {
                Level::ERROR
            },
            ErrorCategory::Provider => Level::WARN,
            ErrorCategory::Validation
            | ErrorCategory::NotFound
            | ErrorCategory::Conflict
            | ErrorCategory::PayloadTooLarge => Level::INFO,
        }
    }
}
