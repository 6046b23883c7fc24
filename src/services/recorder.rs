// SPDX-License-Identifier: MIT

//! Exercise recording service.
//!
//! Handles the core workflow:
//! 1. Validate count and coerce form quality
//! 2. Compute generated power
//! 3. Persist the exercise record
//! 4. Apply side effects to the user: run-to-energy conversion, streak,
//!    experience

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Exercise, ExerciseKind};
use crate::services::{generate_id, progression};
use crate::time_utils::{day_key, format_utc_rfc3339};
use chrono::{DateTime, Utc};

/// Upper bound on reps in a single record.
pub const MAX_REPS_PER_RECORD: f64 = 1000.0;
/// Upper bound on kilometers in a single run record.
pub const MAX_RUN_KM_PER_RECORD: f64 = 50.0;

/// Power generated by an exercise.
///
/// Running counts kilometers and is weighted 10x to normalize against
/// rep-based exercises.
pub fn power_for(kind: ExerciseKind, count: f64, form_quality: f64) -> u32 {
    let base_multiplier = form_quality * 1.5;
    let raw = if kind.is_run() {
        count * 10.0 * base_multiplier
    } else {
        count * base_multiplier
    };
    raw.round() as u32
}

/// Coerce a form quality into 0.1..=1.0. Out-of-range values are clamped,
/// never rejected; only non-finite input is an error.
pub fn clamp_form_quality(form_quality: f64) -> Result<f64> {
    if !form_quality.is_finite() {
        return Err(AppError::Validation(
            "Form quality must be a number".to_string(),
        ));
    }
    Ok(form_quality.clamp(0.1, 1.0))
}

/// Result of a successful record, for API responses.
#[derive(Debug)]
pub struct Recorded {
    pub exercise: Exercise,
    /// Energy granted by a run record, after capping
    pub energy_granted: u32,
    pub levels_gained: u32,
}

/// Validates and records a single exercise event.
#[derive(Clone)]
pub struct Recorder {
    store: Store,
}

impl Recorder {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record one exercise for a user.
    pub async fn record(
        &self,
        user_id: &str,
        kind: ExerciseKind,
        count: f64,
        form_quality: f64,
        now: DateTime<Utc>,
    ) -> Result<Recorded> {
        if !count.is_finite() || count <= 0.0 {
            return Err(AppError::Validation(
                "Count must be greater than zero".to_string(),
            ));
        }
        let cap = if kind.is_run() {
            MAX_RUN_KM_PER_RECORD
        } else {
            MAX_REPS_PER_RECORD
        };
        if count > cap {
            return Err(AppError::Validation(format!(
                "Count exceeds the per-record limit of {}",
                cap
            )));
        }

        let form_quality = clamp_form_quality(form_quality)?;

        let mut user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let power_generated = power_for(kind, count, form_quality);
        let date = day_key(now);

        let exercise = Exercise {
            id: generate_id(now),
            user_id: user_id.to_string(),
            kind,
            count,
            date: date.clone(),
            recorded_at: format_utc_rfc3339(now),
            power_generated,
            form_quality,
        };

        self.store.add_exercise(&exercise).await?;

        // Running converts to energy instead of entering the power pool
        let energy_granted = if kind.is_run() {
            let grant = (f64::from(power_generated) / 2.0).round() as u32;
            let before = user.energy;
            user.grant_energy(grant);
            user.energy - before
        } else {
            0
        };

        // Streak keys off the exercise's own date, not wall-clock at call
        if user.last_workout_date.as_deref() != Some(date.as_str()) {
            user.current_streak += 1;
            user.longest_streak = user.longest_streak.max(user.current_streak);
            user.last_workout_date = Some(date);
        }

        // One experience point per rep or kilometer
        let levels_gained = progression::grant_experience(&mut user, count.round() as u64);

        self.store.upsert_user(&user).await?;

        tracing::info!(
            user_id,
            kind = kind.label(),
            count,
            power_generated,
            energy_granted,
            "Exercise recorded"
        );

        Ok(Recorded {
            exercise,
            energy_granted,
            levels_gained,
        })
    }
}
