//! HTTP heartbeat ingestion

use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::api::dto::HeartbeatRequest;
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::error::AlertSrvError;
use crate::pipeline::{AlertDispatchResult, ReadingSource};

/// Run one reading through the alert pipeline
///
/// @route POST /heartbeat
/// @input ApiJson<HeartbeatRequest> - `{heartbeat: int}`
/// @output Json<AlertDispatchResult> - overall status plus one entry per contact
/// @side-effects Sends SMS to every contact when the reading is below threshold
pub async fn post_heartbeat(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<HeartbeatRequest>,
) -> Result<Json<AlertDispatchResult>, AlertSrvError> {
    let result = state
        .pipeline
        .handle_reading(req.heartbeat, ReadingSource::Http)
        .await?;
    Ok(Json(result))
}
