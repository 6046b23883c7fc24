// SPDX-License-Identifier: MIT

//! Boss listing and battle routes.

use crate::error::{AppError, Result};
use crate::models::{BattleRecord, Weakness};
use crate::services::battle::AttackReport;
use crate::services::{AttackKind, EncounterView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{user_id}/bosses", get(get_bosses))
        .route(
            "/api/users/{user_id}/battle",
            post(start_battle).get(get_battle),
        )
        .route("/api/users/{user_id}/battle/attack", post(attack))
        .route("/api/users/{user_id}/battle/retreat", post(retreat))
        .route("/api/users/{user_id}/battles", get(get_battles))
}

// ─── Boss Roster ─────────────────────────────────────────────

/// A roster boss as shown to one user.
#[derive(Serialize)]
pub struct BossView {
    pub id: String,
    pub name: String,
    pub tier: u8,
    pub max_health: u32,
    pub weakness: Weakness,
    pub description: String,
    /// Derived from this user's victory records
    pub defeated: bool,
}

#[derive(Serialize)]
pub struct BossesResponse {
    pub bosses: Vec<BossView>,
}

/// Bosses visible at the user's tier, with defeated flags.
async fn get_bosses(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BossesResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let defeated = state.battle.defeated_bosses(&user_id).await?;

    let bosses = state
        .roster
        .bosses()
        .iter()
        .filter(|b| b.tier <= user.tier + 1)
        .map(|b| BossView {
            id: b.id.clone(),
            name: b.name.clone(),
            tier: b.tier,
            max_health: b.max_health,
            weakness: b.weakness,
            description: b.description.clone(),
            defeated: defeated.contains(&b.id),
        })
        .collect();

    Ok(Json(BossesResponse { bosses }))
}

// ─── Battle ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartBattleRequest {
    pub boss_id: String,
}

/// Start an encounter.
async fn start_battle(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<StartBattleRequest>,
) -> Result<Json<EncounterView>> {
    let view = state
        .battle
        .start(&user_id, &payload.boss_id, chrono::Utc::now())
        .await?;
    Ok(Json(view))
}

/// Snapshot of the active encounter.
async fn get_battle(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<EncounterView>> {
    state
        .battle
        .active(&user_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No active battle".to_string()))
}

#[derive(Deserialize)]
pub struct AttackRequest {
    pub attack: AttackKind,
}

/// Resolve one attack.
async fn attack(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<AttackRequest>,
) -> Result<Json<AttackReport>> {
    let report = state
        .battle
        .attack(&user_id, payload.attack, chrono::Utc::now())
        .await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct RetreatResponse {
    pub success: bool,
    pub message: String,
}

/// Abandon the active encounter. No record is written.
async fn retreat(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<RetreatResponse>> {
    state.battle.retreat(&user_id)?;
    Ok(Json(RetreatResponse {
        success: true,
        message: "You retreated. The boss keeps its health back.".to_string(),
    }))
}

// ─── History ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BattlesResponse {
    pub battles: Vec<BattleRecord>,
    pub total: u32,
}

/// Battle history for a user, oldest first.
async fn get_battles(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BattlesResponse>> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    let battles = state.db.battles_by_user(&user_id).await?;
    let total = battles.len() as u32;
    Ok(Json(BattlesResponse { battles, total }))
}
