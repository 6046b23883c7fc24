//! Derived training statistics for dashboard queries.
//!
//! The exercise history of a single user is small, so these are computed
//! on demand from the queried records rather than persisted as aggregates.

use crate::models::{DailyGoals, Exercise, ExerciseKind};
use serde::Serialize;

/// Per-kind totals over a set of exercise records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyProgress {
    /// Pushup reps
    pub pushups: u32,
    /// Situp reps
    pub situps: u32,
    /// Squat reps
    pub squats: u32,
    /// Kilometers run
    pub run_km: f64,
    /// Power generated across the set
    pub power_generated: u32,
}

impl DailyProgress {
    /// Fold one record into the totals.
    pub fn accumulate(&mut self, exercise: &Exercise) {
        match exercise.kind {
            ExerciseKind::Pushup => self.pushups += exercise.count as u32,
            ExerciseKind::Situp => self.situps += exercise.count as u32,
            ExerciseKind::Squat => self.squats += exercise.count as u32,
            ExerciseKind::Run => self.run_km += exercise.count,
        }
        self.power_generated += exercise.power_generated;
    }

    pub fn from_exercises(exercises: &[Exercise]) -> Self {
        let mut progress = Self::default();
        for exercise in exercises {
            progress.accumulate(exercise);
        }
        progress
    }
}

/// Training targets scaled to the tier the user is working toward.
pub fn tier_goals(tier: u8) -> DailyGoals {
    let multiplier = u32::from(tier) + 1;
    DailyGoals {
        pushups: 25 * multiplier,
        situps: 25 * multiplier,
        squats: 25 * multiplier,
        run_km: 2.5 * f64::from(multiplier),
    }
}
