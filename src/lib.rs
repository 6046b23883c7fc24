// SPDX-License-Identifier: MIT

//! Herofit: a gamified fitness tracker.
//!
//! This crate provides the backend API for logging workouts, converting
//! them into battle power, and resolving boss battles that unlock
//! cosmetic hero tiers.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{BattleResolver, Ledger, Recorder, RepTracker, Roster};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Store,
    pub roster: Arc<Roster>,
    /// Id of the singleton user created at startup
    pub default_user_id: String,
    pub recorder: Recorder,
    pub ledger: Ledger,
    pub battle: BattleResolver,
    pub rep_tracker: RepTracker,
}
