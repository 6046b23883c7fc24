// SPDX-License-Identifier: MIT

//! Profile and dashboard routes.

use crate::error::{AppError, Result};
use crate::models::stats::tier_goals;
use crate::models::{DailyGoals, DailyProgress, User};
use crate::services::{progression, PowerPool};
use crate::time_utils::{day_key, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/users/{user_id}/avatar", put(update_avatar))
        .route("/api/users/{user_id}/stats", get(get_stats))
        .route("/api/users/{user_id}/power", get(get_power))
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

// ─── User Profile ────────────────────────────────────────────

/// Get the singleton user, stamping the login time.
async fn get_me(State(state): State<Arc<AppState>>) -> Result<Json<User>> {
    let mut user = load_user(&state, &state.default_user_id).await?;
    user.last_login = format_utc_rfc3339(chrono::Utc::now());
    state.db.upsert_user(&user).await?;
    Ok(Json(user))
}

// ─── Avatar ──────────────────────────────────────────────────

/// Partial avatar update.
#[derive(Deserialize, Validate)]
pub struct AvatarUpdateRequest {
    #[validate(length(min = 1, max = 50))]
    pub costume: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,
}

async fn update_avatar(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<AvatarUpdateRequest>,
) -> Result<Json<User>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = load_user(&state, &user_id).await?;
    if let Some(costume) = payload.costume {
        user.avatar.costume = costume;
    }
    if let Some(color) = payload.color {
        user.avatar.color = color;
    }
    state.db.upsert_user(&user).await?;

    tracing::debug!(user_id = %user.id, costume = %user.avatar.costume, color = %user.avatar.color, "Avatar updated");
    Ok(Json(user))
}

// ─── Stats ───────────────────────────────────────────────────

/// Dashboard stats response.
#[derive(Serialize)]
pub struct StatsResponse {
    pub level: u32,
    pub tier: u8,
    pub hero_title: String,
    pub experience: u64,
    /// Cumulative experience at which the next level is reached
    pub next_level_at: u64,
    pub energy: u32,
    pub max_energy: u32,
    pub power: PowerPool,
    pub total_power: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub today: DailyProgress,
    pub week: DailyProgress,
    pub daily_goals: DailyGoals,
    /// Goals scaled to the tier the user is working toward
    pub tier_goals: DailyGoals,
}

/// Get dashboard stats for a user.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsResponse>> {
    let user = load_user(&state, &user_id).await?;

    let now = chrono::Utc::now();
    let today = day_key(now);
    let week_start = day_key(now - chrono::Duration::days(6));

    let today_exercises = state.db.exercises_by_user_and_date(&user_id, &today).await?;
    let week_exercises = state
        .db
        .exercises_by_user_and_date_range(&user_id, &week_start, &today)
        .await?;

    let power = state.ledger.available(&user_id).await?;

    Ok(Json(StatsResponse {
        level: user.level,
        tier: user.tier,
        hero_title: user.hero_title.clone(),
        experience: user.experience,
        next_level_at: progression::xp_threshold(user.level),
        energy: user.energy,
        max_energy: user.max_energy,
        power,
        total_power: power.total(),
        current_streak: user.current_streak,
        longest_streak: user.longest_streak,
        today: DailyProgress::from_exercises(&today_exercises),
        week: DailyProgress::from_exercises(&week_exercises),
        tier_goals: tier_goals(user.tier),
        daily_goals: user.daily_goals,
    }))
}

// ─── Power ───────────────────────────────────────────────────

/// Spendable resources snapshot.
#[derive(Serialize)]
pub struct PowerResponse {
    pub strike: u32,
    pub core: u32,
    pub force: u32,
    pub total: u32,
    pub energy: u32,
    pub max_energy: u32,
}

/// Get the user's available power and energy.
async fn get_power(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PowerResponse>> {
    let user = load_user(&state, &user_id).await?;
    let pool = state.ledger.available(&user_id).await?;

    Ok(Json(PowerResponse {
        strike: pool.strike,
        core: pool.core,
        force: pool.force,
        total: pool.total(),
        energy: user.energy,
        max_energy: user.max_energy,
    }))
}
