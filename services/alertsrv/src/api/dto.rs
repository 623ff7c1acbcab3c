//! Request and response bodies

use serde::{Deserialize, Serialize};

/// `POST /registrations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterContactRequest {
    pub name: String,
    pub phone: String,
}

/// `PUT /registrations/relation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRelationRequest {
    pub id: i64,
    pub relation: String,
}

/// Heartbeat reading, over HTTP and as a WebSocket frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub heartbeat: i64,
}

/// Plain `{status, message}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// `POST /api/sensor/upload-sensor-data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorUploadResponse {
    pub status: String,
    pub message: String,
    pub count: usize,
}

/// `GET /api/sensor/data` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorQuery {
    pub limit: Option<u32>,
}
