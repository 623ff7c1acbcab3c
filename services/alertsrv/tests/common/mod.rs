//! Common test utilities and helpers

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use alertsrv::{
    bootstrap::build_state,
    config::AlertsrvConfig,
    create_routes,
    notify::{DispatchOutcome, NotificationGateway},
    AppState, Result,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ::common::sqlite::SqliteClient;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

/// Gateway stub that records every send
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<(String, i64)>>,
    failing_phones: Vec<String>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sends to these phones report a provider error
    pub fn failing(phones: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing_phones: phones.iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn calls(&self) -> Vec<(String, i64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send_alert(&self, phone: &str, heartbeat: i64) -> DispatchOutcome {
        let sequence = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((phone.to_string(), heartbeat));
            calls.len()
        };
        if self.failing_phones.iter().any(|p| p == phone) {
            DispatchOutcome::error("Invalid 'To' phone number")
        } else {
            DispatchOutcome::success(format!("SM{:04}", sequence))
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Configuration with dummy provider credentials
pub fn test_config() -> AlertsrvConfig {
    let mut config = AlertsrvConfig::default();
    config.sms.account_sid = "ACtest".to_string();
    config.sms.auth_token = "test-token".to_string();
    config.sms.from_number = "+15005550006".to_string();
    config
}

/// In-memory database; one connection so every query sees the same data
pub async fn memory_client() -> SqliteClient {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteClient::from_pool(pool)
}

pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub gateway: Arc<RecordingGateway>,
}

/// Build state and router around an in-memory database and `gateway`
pub async fn create_test_app(gateway: Arc<RecordingGateway>) -> Result<TestApp> {
    let state = build_state(test_config(), memory_client().await, gateway.clone()).await?;
    let router = create_routes(state.clone());
    Ok(TestApp {
        router,
        state,
        gateway,
    })
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = if let Some(json) = body {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap()
    } else {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body_bytes).into_owned())
        })
    };

    (status, body)
}

/// Register a contact and return its id
pub async fn register(app: &axum::Router, name: &str, phone: &str) -> i64 {
    let (status, body) = json_request(
        app,
        "POST",
        "/registrations",
        Some(json!({ "name": name, "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["id"].as_i64().unwrap()
}

/// Serve `router` on an ephemeral local port
pub async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
