//! Contact registration API tests

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use axum::http::StatusCode;
use serde_json::json;

mod common;
use crate::common::{create_test_app, json_request, register, RecordingGateway};

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();

    let (status, body) = json_request(&app.router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = json_request(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "alertsrv");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_register_and_list() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/registrations",
        Some(json!({ "name": "A", "phone": "01011112222" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "A");
    assert_eq!(body["phone"], "01011112222");
    assert_eq!(body["relation"], "");

    register(&app.router, "B", "01033334444").await;

    let (status, body) = json_request(&app.router, "GET", "/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0]["id"], 1);
    assert_eq!(contacts[1]["name"], "B");
}

#[tokio::test]
async fn test_duplicate_phone_conflict() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();
    register(&app.router, "A", "01011112222").await;

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/registrations",
        Some(json!({ "name": "Someone else", "phone": "01011112222" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 409);
}

#[tokio::test]
async fn test_invalid_phone_rejected() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();

    for phone in ["0101111222", "010111122223", "010-1111-222", "abcdefghijk"] {
        let (status, body) = json_request(
            &app.router,
            "POST",
            "/registrations",
            Some(json!({ "name": "A", "phone": phone })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "phone {}", phone);
        assert_eq!(body["error"]["code"], 422);
    }

    // Missing field is rejected by the extractor
    let (status, body) = json_request(
        &app.router,
        "POST",
        "/registrations",
        Some(json!({ "name": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 422);
    assert!(body["error"]["message"].as_str().unwrap().contains("phone"));

    let (_, body) = json_request(&app.router, "GET", "/registrations", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_relation() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();
    let id = register(&app.router, "A", "01011112222").await;

    let (status, body) = json_request(
        &app.router,
        "PUT",
        "/registrations/relation",
        Some(json!({ "id": id, "relation": "daughter" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["relation"], "daughter");

    let (status, body) = json_request(
        &app.router,
        "PUT",
        "/registrations/relation",
        Some(json!({ "id": 999, "relation": "son" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn test_delete_contact() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();
    let id = register(&app.router, "A", "01011112222").await;

    let uri = format!("/registrations/{}", id);
    let (status, body) = json_request(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = json_request(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = json_request(&app.router, "GET", "/registrations", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_register_paths() {
    let app = create_test_app(RecordingGateway::new()).await.unwrap();

    let (status, body) = json_request(
        &app.router,
        "POST",
        "/api/register",
        Some(json!({ "name": "A", "phone": "01011112222" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = json_request(&app.router, "GET", "/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let uri = format!("/api/register/{}", id);
    let (status, _) = json_request(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}
