//! Shared API models for SmartCane services
//!
//! Response envelopes and the axum-facing `AppError` used by every service
//! so error bodies look the same across endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use errors::{CaneErrorTrait, ErrorInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn bool_true() -> bool {
    true
}

fn bool_false() -> bool {
    false
}

// ============================================================================
// Standard API Response Models
// ============================================================================

/// Standard success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    /// Success indicator (always true)
    #[serde(default = "bool_true")]
    pub success: bool,
    /// Response data
    pub data: T,
    /// Additional metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> SuccessResponse<T> {
    /// Create a new success response
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the response
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Success indicator (always false for errors)
    #[serde(default = "bool_false")]
    pub success: bool,
    /// Error information
    pub error: ErrorInfo,
}

// ============================================================================
// AppError - HTTP Error with proper status codes
// ============================================================================

/// Application error with HTTP status code
#[derive(Debug, Clone)]
pub struct AppError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error information
    pub error: ErrorInfo,
}

impl AppError {
    /// Create a new error
    pub fn new(status: StatusCode, error: ErrorInfo) -> Self {
        Self { status, error }
    }

    /// Client-side rejection raised outside a service handler
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorInfo::new(message).with_code(status.as_u16()),
        }
    }

    /// Build from any service error, logging it at the error's own level
    ///
    /// Server-side causes are logged here and masked in the response body.
    pub fn from_service_error<E: CaneErrorTrait>(err: &E) -> Self {
        match err.log_level() {
            tracing::Level::ERROR => {
                tracing::error!(code = err.error_code(), "Request failed: {}", err)
            },
            tracing::Level::WARN => {
                tracing::warn!(code = err.error_code(), "Request failed: {}", err)
            },
            _ => tracing::debug!(code = err.error_code(), "Request rejected: {}", err),
        }

        Self::new(err.http_status(), err.to_error_info())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.error,
            }),
        )
            .into_response()
    }
}
