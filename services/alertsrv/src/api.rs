//! HTTP and WebSocket API

pub mod contact_handlers;
pub mod dto;
pub mod extract;
pub mod health_handlers;
pub mod heartbeat_handlers;
pub mod sensor_handlers;
