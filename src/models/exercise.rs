// SPDX-License-Identifier: MIT

//! Exercise records and the power buckets they feed.

use serde::{Deserialize, Serialize};

/// The four supported exercise kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Pushup,
    Situp,
    Squat,
    Run,
}

impl ExerciseKind {
    /// Running is measured in kilometers, everything else in reps.
    pub fn is_run(self) -> bool {
        matches!(self, ExerciseKind::Run)
    }

    /// The spendable power bucket this kind feeds.
    ///
    /// Running feeds energy instead of the power pool, so it maps to no
    /// bucket here.
    pub fn power_bucket(self) -> Option<PowerBucket> {
        match self {
            ExerciseKind::Pushup => Some(PowerBucket::Strike),
            ExerciseKind::Situp => Some(PowerBucket::Core),
            ExerciseKind::Squat => Some(PowerBucket::Force),
            ExerciseKind::Run => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::Situp => "situp",
            ExerciseKind::Squat => "squat",
            ExerciseKind::Run => "run",
        }
    }
}

/// Named buckets of the spendable power pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerBucket {
    Strike,
    Core,
    Force,
}

/// Stored exercise record. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Opaque id (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    /// Reps, or kilometers for runs. Always > 0.
    pub count: f64,
    /// Day key (`YYYY-MM-DD`) the exercise belongs to
    pub date: String,
    /// Full timestamp of the record (RFC 3339)
    pub recorded_at: String,
    /// Power computed at record time, >= 0
    pub power_generated: u32,
    /// Form quality after clamping, in 0.1..=1.0
    pub form_quality: f64,
}
