//! Sensor batch upload and query handlers

use axum::{
    extract::{Query, State},
    response::Json,
};
use common::SuccessResponse;
use std::sync::Arc;

use crate::api::dto::{SensorQuery, SensorUploadResponse};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::error::AlertSrvError;
use crate::sensor::{SensorReading, StoredSensorReading};

/// Store a batch of readings in one transaction
///
/// @route POST /api/sensor/upload-sensor-data
/// @input ApiJson<Vec<SensorReading>>
pub async fn upload_sensor_data(
    State(state): State<Arc<AppState>>,
    ApiJson(readings): ApiJson<Vec<SensorReading>>,
) -> Result<Json<SensorUploadResponse>, AlertSrvError> {
    let count = state.sensors.insert_batch(&readings).await?;
    Ok(Json(SensorUploadResponse {
        status: "success".to_string(),
        message: "Sensor data stored".to_string(),
        count,
    }))
}

/// Most recent readings, newest first
///
/// @route GET /api/sensor/data?limit=N
pub async fn list_sensor_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SensorQuery>,
) -> Result<Json<SuccessResponse<Vec<StoredSensorReading>>>, AlertSrvError> {
    let readings = state.sensors.list_recent(query.limit).await?;
    let count = readings.len();
    Ok(Json(
        SuccessResponse::new(readings).with_metadata("count", serde_json::Value::from(count)),
    ))
}
