// SPDX-License-Identifier: MIT

//! Battle history records.

use crate::models::{PowerBucket, Weakness};
use serde::{Deserialize, Serialize};

/// Outcome of a finished encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Per-bucket breakdown of power spent in an encounter.
///
/// `endurance` is carried for record-format compatibility with older data;
/// the resolver never drains it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSpent {
    pub strike: u32,
    pub core: u32,
    pub force: u32,
    #[serde(default)]
    pub endurance: u32,
}

impl PowerSpent {
    pub fn total(&self) -> u32 {
        self.strike + self.core + self.force + self.endurance
    }

    pub fn bucket(&self, bucket: PowerBucket) -> u32 {
        match bucket {
            PowerBucket::Strike => self.strike,
            PowerBucket::Core => self.core,
            PowerBucket::Force => self.force,
        }
    }

    pub fn bucket_mut(&mut self, bucket: PowerBucket) -> &mut u32 {
        match bucket {
            PowerBucket::Strike => &mut self.strike,
            PowerBucket::Core => &mut self.core,
            PowerBucket::Force => &mut self.force,
        }
    }

    pub fn add(&mut self, other: &PowerSpent) {
        self.strike += other.strike;
        self.core += other.core;
        self.force += other.force;
        self.endurance += other.endurance;
    }

    /// Whether a boss weakness names a bucket with a nonzero share here.
    pub fn matches_weakness(&self, weakness: Weakness) -> bool {
        match weakness {
            Weakness::Strike => self.strike > 0,
            Weakness::Core => self.core > 0,
            Weakness::Force => self.force > 0,
            Weakness::Endurance => self.endurance > 0,
            Weakness::Balanced => false,
        }
    }
}

/// Stored battle record. Append-only; victories derive the defeated-boss
/// set and gate tier advancement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Opaque id (also used as document ID)
    pub id: String,
    pub user_id: String,
    pub boss_id: String,
    /// When the encounter ended (RFC 3339)
    pub recorded_at: String,
    pub result: BattleOutcome,
    /// Total damage dealt over the encounter
    pub damage_dealt: u32,
    /// Power drained over the encounter, per bucket
    pub power_spent: PowerSpent,
}
