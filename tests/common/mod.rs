// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use herofit::config::Config;
use herofit::db::Store;
use herofit::models::User;
use herofit::routes::create_router;
use herofit::services::{BattleResolver, Landmark, Ledger, Recorder, RepTracker, Roster};
use herofit::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Id of the pre-created test user.
pub const TEST_USER_ID: &str = "hero-1";

fn build_state(db: Store) -> Arc<AppState> {
    let config = Config::default();
    let roster = Arc::new(Roster::builtin());

    Arc::new(AppState {
        recorder: Recorder::new(db.clone()),
        ledger: Ledger::new(db.clone()),
        battle: BattleResolver::new(db.clone(), roster.clone()),
        rep_tracker: RepTracker::new(),
        default_user_id: TEST_USER_ID.to_string(),
        roster,
        db,
        config,
    })
}

/// Create a test app over an in-memory store with one user.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let db = Store::in_memory();
    let user = User::new(
        TEST_USER_ID.to_string(),
        "Hero".to_string(),
        "2024-01-01T00:00:00Z".to_string(),
    );
    db.upsert_user(&user).await.expect("seed user");

    let state = build_state(db);
    (create_router(state.clone()), state)
}

/// Create a test app whose store fails every operation.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let state = build_state(Store::offline());
    (create_router(state.clone()), state)
}

/// Issue a GET and decode the JSON body.
#[allow(dead_code)]
pub async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    decode(response).await
}

/// Issue a request with a JSON body and decode the JSON response.
#[allow(dead_code)]
pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    decode(response).await
}

async fn decode(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, value)
}

/// A synthetic landmark frame with every point visible and both elbows at
/// the given interior angle.
#[allow(dead_code)]
pub fn pose_frame(elbow_degrees: f64, hip_y: f64) -> Vec<Landmark> {
    let mut frame = vec![
        Landmark {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            visibility: 1.0,
        };
        33
    ];

    for (shoulder, elbow, wrist, x0) in [(11, 13, 15, 0.3), (12, 14, 16, 0.7)] {
        frame[shoulder] = Landmark {
            x: x0,
            y: 0.2,
            z: 0.0,
            visibility: 1.0,
        };
        frame[elbow] = Landmark {
            x: x0,
            y: 0.4,
            z: 0.0,
            visibility: 1.0,
        };
        let theta = elbow_degrees.to_radians();
        frame[wrist] = Landmark {
            x: x0 + 0.2 * theta.sin(),
            y: 0.4 - 0.2 * theta.cos(),
            z: 0.0,
            visibility: 1.0,
        };
    }

    for hip in [23, 24] {
        frame[hip] = Landmark {
            x: 0.5,
            y: hip_y,
            z: 0.0,
            visibility: 1.0,
        };
    }

    frame
}
