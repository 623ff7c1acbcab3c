//! SmartCane basic library
//!
//! Provides functions shared by all services:
//! - logging and HTTP access logging
//! - service bootstrap (banner, .env loading, port resolution)
//! - graceful shutdown
//! - SQLite client
//! - API response envelopes

pub mod api_types;
pub mod logging;
pub mod service_bootstrap;
pub mod shutdown;
pub mod sqlite;

pub use api_types::{AppError, ErrorResponse, SuccessResponse};
pub use errors::ErrorInfo;

/// Default bind host for service APIs
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
