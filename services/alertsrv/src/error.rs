//! Error handling for the Alert Service

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::AppError;
use errors::{CaneError, CaneErrorTrait, ErrorCategory};
use thiserror::Error;

/// Alert Service error type
#[derive(Error, Debug, Clone)]
pub enum AlertSrvError {
    /// Malformed phone, name, heartbeat or sensor input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Phone number already registered
    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    /// Contact id absent
    #[error("Contact not found: {0}")]
    NotFound(i64),

    /// Request body over the size limit
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// SMS provider rejected or failed a send
    #[error("Provider dispatch failed: {0}")]
    ProviderDispatch(String),

    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for the Alert Service
pub type Result<T> = std::result::Result<T, AlertSrvError>;

impl AlertSrvError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AlertSrvError::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AlertSrvError::Configuration(msg.into())
    }
}

impl CaneErrorTrait for AlertSrvError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicatePhone(_) => "DUPLICATE_PHONE",
            Self::NotFound(_) => "CONTACT_NOT_FOUND",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::ProviderDispatch(_) => "PROVIDER_DISPATCH_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::DuplicatePhone(_) => ErrorCategory::Conflict,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::PayloadTooLarge(_) => ErrorCategory::PayloadTooLarge,
            Self::ProviderDispatch(_) => ErrorCategory::Provider,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Database(_) => ErrorCategory::Database,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

impl IntoResponse for AlertSrvError {
    fn into_response(self) -> Response {
        AppError::from_service_error(&self).into_response()
    }
}

impl From<sqlx::Error> for AlertSrvError {
    fn from(err: sqlx::Error) -> Self {
        AlertSrvError::Database(err.to_string())
    }
}

/// Body extractor failures share the error envelope of handler errors
impl From<JsonRejection> for AlertSrvError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AlertSrvError::PayloadTooLarge(rejection.body_text())
        } else {
            AlertSrvError::Validation(rejection.body_text())
        }
    }
}

impl From<CaneError> for AlertSrvError {
    fn from(err: CaneError) -> Self {
        match err {
            CaneError::Configuration(msg) => AlertSrvError::Configuration(msg),
            CaneError::Database(msg) => AlertSrvError::Database(msg),
            CaneError::Sqlite(e) => AlertSrvError::Database(e.to_string()),
            other => AlertSrvError::Internal(other.to_string()),
        }
    }
}

impl From<AlertSrvError> for CaneError {
    fn from(err: AlertSrvError) -> Self {
        match err {
            AlertSrvError::Configuration(msg) => CaneError::Configuration(msg),
            AlertSrvError::Database(msg) => CaneError::Database(msg),
            other => CaneError::Internal(other.to_string()),
        }
    }
}
