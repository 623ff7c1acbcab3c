//! Health check and greeting

#![allow(clippy::disallowed_methods)] // json! macro used in multiple functions

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app_state::AppState;

/// Service greeting
///
/// @route GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Heartbeat alert service is running" }))
}

/// Health check including database connectivity
///
/// @route GET /health
/// @output 200 when the database answers, 503 otherwise
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let (status, database) = match state.sqlite_client.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            warn!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "error")
        },
    };

    let body = json!({
        "status": if status == StatusCode::OK { "healthy" } else { "unhealthy" },
        "service": state.config.service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    });
    (status, Json(body))
}
