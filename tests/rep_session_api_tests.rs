// SPDX-License-Identifier: MIT

//! Camera rep-session API tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::TEST_USER_ID;

async fn open_session(app: &axum::Router, exercise: &str) -> String {
    let (status, body) = common::send_json(
        app,
        "POST",
        &format!("/api/users/{}/rep-sessions", TEST_USER_ID),
        &json!({"exercise": exercise}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

fn swing_frames(reps: usize) -> serde_json::Value {
    let mut frames = Vec::new();
    for _ in 0..reps {
        frames.push(common::pose_frame(170.0, 0.5));
        frames.push(common::pose_frame(80.0, 0.6));
        frames.push(common::pose_frame(170.0, 0.5));
    }
    serde_json::to_value(frames).unwrap()
}

#[tokio::test]
async fn test_feed_counts_reps_and_finish_records_exercise() {
    let (app, _state) = common::create_test_app().await;
    let session_id = open_session(&app, "pushup").await;

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": swing_frames(3)}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reps"], 3);
    assert_eq!(body["reps_completed"], 3);
    // 0.5 start + 3 * 0.05
    let quality = body["form_quality"].as_f64().unwrap();
    assert!((quality - 0.65).abs() < 1e-9);

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/finish", session_id),
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercise"]["type"], "pushup");
    assert_eq!(body["exercise"]["count"], 3.0);
    // round(3 * 0.65 * 1.5) = 3
    assert_eq!(body["exercise"]["power_generated"], 3);

    // The committed record is queryable like any manual one
    let date = body["exercise"]["date"].as_str().unwrap();
    let (_, history) = common::get_json(
        &app,
        &format!("/api/users/{}/exercises?date={}", TEST_USER_ID, date),
    )
    .await;
    assert_eq!(history["total"], 1);

    // Finished sessions are gone
    let (status, _) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": swing_frames(1)}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_low_visibility_gives_feedback_without_counting() {
    let (app, _state) = common::create_test_app().await;
    let session_id = open_session(&app, "pushup").await;

    let mut hidden = common::pose_frame(80.0, 0.6);
    hidden[15].visibility = 0.2;
    let frames = serde_json::to_value(vec![
        common::pose_frame(170.0, 0.5),
        hidden,
        common::pose_frame(170.0, 0.5),
    ])
    .unwrap();

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": frames}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reps"], 0);
    assert_eq!(body["feedback"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_rep_session_cannot_be_finished() {
    let (app, _state) = common::create_test_app().await;
    let session_id = open_session(&app, "pushup").await;

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/finish", session_id),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    // The session survives the rejected finish and can be abandoned
    let (status, _) = common::send_json(
        &app,
        "DELETE",
        &format!("/api/rep-sessions/{}", session_id),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unsupported_exercise_feeds_feedback_only() {
    let (app, _state) = common::create_test_app().await;
    let session_id = open_session(&app, "squat").await;

    let (status, body) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": swing_frames(2)}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reps"], 0);
    assert!(!body["feedback"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_frames_are_rejected() {
    let (app, _state) = common::create_test_app().await;
    let session_id = open_session(&app, "pushup").await;

    // Empty batch fails request validation
    let (status, _) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A frame with the wrong landmark count fails the counter
    let (status, _) = common::send_json(
        &app,
        "POST",
        &format!("/api/rep-sessions/{}/frames", session_id),
        &json!({"frames": [[{"x": 0.0, "y": 0.0, "z": 0.0, "visibility": 1.0}]]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown session
    let (status, _) = common::send_json(
        &app,
        "POST",
        "/api/rep-sessions/nope/frames",
        &json!({"frames": swing_frames(1)}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
