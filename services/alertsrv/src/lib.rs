//! AlertSrv - heartbeat alert service
//!
//! Keeps a registry of emergency contacts, ingests heartbeat readings over
//! HTTP and WebSocket, and sends an SMS to every contact when a reading drops
//! below the alert threshold. Also stores environmental sensor batches.

pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod contacts;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod routes;
pub mod sensor;
pub mod websocket;

pub use app_state::AppState;
pub use config::AlertsrvConfig;
pub use error::{AlertSrvError, Result};
pub use routes::create_routes;
