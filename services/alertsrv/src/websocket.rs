//! WebSocket heartbeat stream
//!
//! One connection carries a serial stream of readings: receive, run the
//! pipeline, acknowledge, repeat. Readings on one connection never overlap.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::dto::HeartbeatRequest;
use crate::app_state::AppState;
use crate::pipeline::ReadingSource;

/// Reply pushed after every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamReply {
    /// Reading accepted; `status` is "error" if the pipeline failed
    Ack {
        status: String,
        data: HeartbeatRequest,
    },
    /// Frame could not be used as a reading
    Rejected { status: String, message: String },
}

impl StreamReply {
    fn ack(reading: HeartbeatRequest) -> Self {
        StreamReply::Ack {
            status: "success".to_string(),
            data: reading,
        }
    }

    fn failed(reading: HeartbeatRequest) -> Self {
        StreamReply::Ack {
            status: "error".to_string(),
            data: reading,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        StreamReply::Rejected {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// WebSocket upgrade handler
///
/// @route GET /heartbeat (WebSocket)
pub async fn heartbeat_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!("Heartbeat stream opened: {}", conn_id);

    let (mut sender, mut receiver) = socket.split();

    while let Some(frame) = receiver.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                warn!("Heartbeat stream {} transport error: {}", conn_id, e);
                break;
            },
        };

        let reply = match message {
            Message::Text(text) => process_frame(&state, text.as_str()).await,
            Message::Binary(_) => StreamReply::rejected("Binary frames are not supported"),
            Message::Close(_) => {
                debug!("Heartbeat stream {} closed by peer", conn_id);
                break;
            },
            // Pings are answered by the transport
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        let payload = match serde_json::to_string(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode heartbeat reply: {}", e);
                break;
            },
        };
        if sender.send(Message::Text(payload.into())).await.is_err() {
            debug!("Heartbeat stream {} peer went away", conn_id);
            break;
        }
    }

    // Peer may already be gone
    let _ = sender.send(Message::Close(None)).await;
    info!("Heartbeat stream closed: {}", conn_id);
}

/// Parse one frame, run the pipeline and build the reply
pub async fn process_frame(state: &AppState, text: &str) -> StreamReply {
    let reading: HeartbeatRequest = match serde_json::from_str(text) {
        Ok(reading) => reading,
        Err(e) => return StreamReply::rejected(format!("Invalid heartbeat frame: {}", e)),
    };
    if reading.heartbeat < 0 {
        return StreamReply::rejected("Heartbeat must be a non-negative integer");
    }

    match state
        .pipeline
        .handle_reading(reading.heartbeat, ReadingSource::Stream)
        .await
    {
        Ok(result) => {
            debug!(
                "Stream reading {} handled: {:?}",
                reading.heartbeat, result.status
            );
            StreamReply::ack(reading)
        },
        Err(e) => {
            error!("Pipeline failed for stream reading {}: {}", reading.heartbeat, e);
            StreamReply::failed(reading)
        },
    }
}
