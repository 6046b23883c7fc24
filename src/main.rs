// SPDX-License-Identifier: MIT

//! Herofit API Server
//!
//! Logs workouts, converts them into battle power and energy, and resolves
//! boss battles that advance the hero's tier.

use herofit::{
    config::Config,
    db::Store,
    services::{self, BattleResolver, Ledger, Recorder, RepTracker, Roster},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Herofit API");

    // Open the record store
    let db = if config.data_file.is_empty() {
        tracing::warn!("DATA_FILE is empty; using a volatile in-memory store");
        Store::in_memory()
    } else {
        Store::open(&config.data_file)
            .await
            .expect("Failed to open store")
    };

    // Load the boss roster
    let roster = match &config.boss_roster_file {
        Some(path) => {
            tracing::info!(path = %path, "Loading boss roster");
            Roster::load_from_file(path).expect("Failed to load boss roster")
        }
        None => Roster::builtin(),
    };
    let roster = Arc::new(roster);
    tracing::info!(count = roster.bosses().len(), "Boss roster ready");

    // Single-user installation: make sure the hero exists
    let user = services::ensure_default_user(&db, &config.hero_name, chrono::Utc::now())
        .await
        .expect("Failed to initialize user");
    tracing::info!(user_id = %user.id, name = %user.name, tier = user.tier, "Hero ready");

    // Build shared state
    let state = Arc::new(AppState {
        recorder: Recorder::new(db.clone()),
        ledger: Ledger::new(db.clone()),
        battle: BattleResolver::new(db.clone(), roster.clone()),
        rep_tracker: RepTracker::new(),
        default_user_id: user.id,
        roster,
        db,
        config: config.clone(),
    });

    // Build router
    let app = herofit::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herofit=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
