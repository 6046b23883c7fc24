// SPDX-License-Identifier: MIT

//! Error-path tests: store failures and malformed requests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::TEST_USER_ID;

#[tokio::test]
async fn test_offline_store_surfaces_database_error() {
    let (app, _state) = common::create_offline_app();

    let (status, body) = common::get_json(&app, "/api/me").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    // Details are withheld from the client
    assert!(body.get("details").is_none());

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/users/{}/exercises", TEST_USER_ID),
        &json!({"type": "pushup", "count": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
}

#[tokio::test]
async fn test_operations_fail_independently() {
    let (app, _state) = common::create_offline_app();

    // The health endpoint never touches the store
    let (status, body) = common::get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_invalid_json_body_is_a_client_error() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&format!("/api/users/{}/exercises", TEST_USER_ID))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Unknown attack kind fails deserialization
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&format!("/api/users/{}/battle/attack", TEST_USER_ID))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"attack": "ultimate"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _state) = common::create_test_app().await;
    let (status, _) = common::get_json(&app, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
