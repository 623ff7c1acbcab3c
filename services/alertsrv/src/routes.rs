//! API Route Configuration
//!
//! Central route definition for all Alert Service endpoints

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use common::logging::http_request_logger;
use std::sync::Arc;

use crate::api::contact_handlers::{delete_contact, list_contacts, register_contact, update_relation};
use crate::api::health_handlers::{health_check, root};
use crate::api::heartbeat_handlers::post_heartbeat;
use crate::api::sensor_handlers::{list_sensor_data, upload_sensor_data};
use crate::app_state::AppState;
use crate::websocket::heartbeat_ws;

/// Contact registration routes, mounted at `/registrations` and `/api/register`
fn contact_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(register_contact).get(list_contacts))
        .route("/relation", put(update_relation))
        .route("/{id}", delete(delete_contact))
}

/// Create the service router with all routes
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Heartbeat ingestion: HTTP POST and WebSocket on the same path
        .route("/heartbeat", post(post_heartbeat).get(heartbeat_ws))
        .nest("/registrations", contact_routes())
        // Sensor batches
        .route("/api/sensor/upload-sensor-data", post(upload_sensor_data))
        .route("/api/sensor/data", get(list_sensor_data))
        // Paths used by deployed device and mobile clients
        .nest("/api/register", contact_routes())
        .route("/api/mms/heartbeat", post(post_heartbeat))
        .route("/MMS/heartbeat", get(heartbeat_ws))
        .layer(middleware::from_fn(http_request_logger))
        .with_state(state)
}
