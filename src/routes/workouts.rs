// SPDX-License-Identifier: MIT

//! Exercise recording, history queries, and camera rep sessions.

use crate::error::{AppError, Result};
use crate::models::{Exercise, ExerciseKind};
use crate::services::rep_counter::FeedSummary;
use crate::services::Landmark;
use crate::time_utils::parse_day_key;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/{user_id}/exercises",
            post(record_exercise).get(get_exercises),
        )
        .route("/api/users/{user_id}/rep-sessions", post(start_rep_session))
        .route("/api/rep-sessions/{session_id}/frames", post(feed_frames))
        .route("/api/rep-sessions/{session_id}/finish", post(finish_rep_session))
        .route("/api/rep-sessions/{session_id}", delete(abandon_rep_session))
}

// ─── Recording ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecordExerciseRequest {
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    /// Reps, or kilometers for runs
    pub count: f64,
    /// Defaults to a mid-scale estimate when the client has no signal
    #[serde(default = "default_form_quality")]
    pub form_quality: f64,
}

fn default_form_quality() -> f64 {
    0.7
}

#[derive(Serialize)]
pub struct RecordExerciseResponse {
    pub exercise: Exercise,
    pub energy_granted: u32,
    pub levels_gained: u32,
}

/// Record one exercise set.
async fn record_exercise(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<RecordExerciseRequest>,
) -> Result<Json<RecordExerciseResponse>> {
    let recorded = state
        .recorder
        .record(
            &user_id,
            payload.kind,
            payload.count,
            payload.form_quality,
            chrono::Utc::now(),
        )
        .await?;

    Ok(Json(RecordExerciseResponse {
        exercise: recorded.exercise,
        energy_granted: recorded.energy_granted,
        levels_gained: recorded.levels_gained,
    }))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExercisesQuery {
    /// Single day (`YYYY-MM-DD`)
    date: Option<String>,
    /// Inclusive range start (`YYYY-MM-DD`)
    start: Option<String>,
    /// Inclusive range end (`YYYY-MM-DD`)
    end: Option<String>,
}

fn require_day_key(raw: &str, param: &str) -> Result<()> {
    parse_day_key(raw)
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(format!("Invalid '{}': expected YYYY-MM-DD", param)))
}

#[derive(Serialize)]
pub struct ExercisesResponse {
    pub exercises: Vec<Exercise>,
    pub total: u32,
}

/// Get a user's exercise history, by day, by range, or in full.
async fn get_exercises(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ExercisesQuery>,
) -> Result<Json<ExercisesResponse>> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    let exercises = match (&params.date, &params.start, &params.end) {
        (Some(date), None, None) => {
            require_day_key(date, "date")?;
            state.db.exercises_by_user_and_date(&user_id, date).await?
        }
        (None, Some(start), Some(end)) => {
            require_day_key(start, "start")?;
            require_day_key(end, "end")?;
            if start > end {
                return Err(AppError::Validation(
                    "'start' must not be after 'end'".to_string(),
                ));
            }
            state
                .db
                .exercises_by_user_and_date_range(&user_id, start, end)
                .await?
        }
        (None, None, None) => state.db.exercises_by_user(&user_id).await?,
        _ => {
            return Err(AppError::Validation(
                "Use either 'date' or both 'start' and 'end'".to_string(),
            ))
        }
    };

    let total = exercises.len() as u32;
    Ok(Json(ExercisesResponse { exercises, total }))
}

// ─── Rep Sessions ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartRepSessionRequest {
    pub exercise: ExerciseKind,
}

#[derive(Serialize)]
pub struct StartRepSessionResponse {
    pub session_id: String,
}

/// Open a camera rep-counting session.
async fn start_rep_session(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<StartRepSessionRequest>,
) -> Result<Json<StartRepSessionResponse>> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    let session_id = state
        .rep_tracker
        .start(&user_id, payload.exercise, chrono::Utc::now());
    Ok(Json(StartRepSessionResponse { session_id }))
}

#[derive(Deserialize, Validate)]
pub struct FeedFramesRequest {
    /// Landmark frames in arrival order
    #[validate(length(min = 1, max = 1000))]
    pub frames: Vec<Vec<Landmark>>,
}

/// Feed a batch of landmark frames into a session.
async fn feed_frames(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<FeedFramesRequest>,
) -> Result<Json<FeedSummary>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = state.rep_tracker.feed(&session_id, &payload.frames)?;
    Ok(Json(summary))
}

/// Finish a session, committing its count through the recorder.
async fn finish_rep_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<RecordExerciseResponse>> {
    let finished = state.rep_tracker.finish(&session_id)?;

    let recorded = state
        .recorder
        .record(
            &finished.user_id,
            finished.kind,
            f64::from(finished.reps),
            finished.form_quality,
            chrono::Utc::now(),
        )
        .await?;

    tracing::info!(
        session_id,
        user_id = %finished.user_id,
        reps = finished.reps,
        "Rep session committed"
    );

    Ok(Json(RecordExerciseResponse {
        exercise: recorded.exercise,
        energy_granted: recorded.energy_granted,
        levels_gained: recorded.levels_gained,
    }))
}

/// Discard a session without recording.
async fn abandon_rep_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode> {
    state.rep_tracker.abandon(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}
