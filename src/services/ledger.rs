// SPDX-License-Identifier: MIT

//! Derived power ledger.
//!
//! Spendable power is never stored as its own counter. Generation is the
//! sum of `power_generated` over non-run exercises, bucketed by kind;
//! committed spend is the sum of the per-bucket breakdowns on persisted
//! battle records. Available power is the difference, floored at zero per
//! bucket. Running feeds energy instead, which lives on the User record.

use crate::db::Store;
use crate::error::Result;
use crate::models::{BattleRecord, Exercise, PowerBucket};
use serde::Serialize;

/// Available power, per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerPool {
    /// From pushups
    pub strike: u32,
    /// From situps
    pub core: u32,
    /// From squats
    pub force: u32,
}

impl PowerPool {
    pub fn total(&self) -> u32 {
        self.strike + self.core + self.force
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
}

/// Computes power pools from persisted history.
#[derive(Clone)]
pub struct Ledger {
    store: Store,
}

impl Ledger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Power available to spend: generated minus committed spend.
    pub async fn available(&self, user_id: &str) -> Result<PowerPool> {
        let exercises = self.store.exercises_by_user(user_id).await?;
        let battles = self.store.battles_by_user(user_id).await?;
        Ok(derive_pool(&exercises, &battles))
    }
}

/// Fold exercise generation and battle spend into an available pool.
pub fn derive_pool(exercises: &[Exercise], battles: &[BattleRecord]) -> PowerPool {
    let mut pool = PowerPool::default();

    for exercise in exercises {
        if let Some(bucket) = exercise.kind.power_bucket() {
            *pool.bucket_mut(bucket) += exercise.power_generated;
        }
    }

    for battle in battles {
        pool.strike = pool.strike.saturating_sub(battle.power_spent.strike);
        pool.core = pool.core.saturating_sub(battle.power_spent.core);
        pool.force = pool.force.saturating_sub(battle.power_spent.force);
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BattleOutcome, ExerciseKind, PowerSpent};

    fn make_exercise(kind: ExerciseKind, power: u32) -> Exercise {
        Exercise {
            id: "e".to_string(),
            user_id: "u1".to_string(),
            kind,
            count: 10.0,
            date: "2024-01-15".to_string(),
            recorded_at: "2024-01-15T10:00:00Z".to_string(),
            power_generated: power,
            form_quality: 0.8,
        }
    }

    fn make_battle(spent: PowerSpent) -> BattleRecord {
        BattleRecord {
            id: "b".to_string(),
            user_id: "u1".to_string(),
            boss_id: "boss1".to_string(),
            recorded_at: "2024-01-16T10:00:00Z".to_string(),
            result: BattleOutcome::Victory,
            damage_dealt: 100,
            power_spent: spent,
        }
    }

    #[test]
    fn test_generation_buckets_by_kind() {
        let exercises = vec![
            make_exercise(ExerciseKind::Pushup, 24),
            make_exercise(ExerciseKind::Situp, 12),
            make_exercise(ExerciseKind::Squat, 18),
        ];

        let pool = derive_pool(&exercises, &[]);
        assert_eq!(pool.strike, 24);
        assert_eq!(pool.core, 12);
        assert_eq!(pool.force, 18);
        assert_eq!(pool.total(), 54);
    }

    #[test]
    fn test_run_power_stays_out_of_the_pool() {
        let exercises = vec![make_exercise(ExerciseKind::Run, 75)];
        let pool = derive_pool(&exercises, &[]);
        assert_eq!(pool.total(), 0);
    }

    #[test]
    fn test_battle_spend_is_subtracted_and_floored() {
        let exercises = vec![make_exercise(ExerciseKind::Pushup, 30)];
        let battles = vec![make_battle(PowerSpent {
            strike: 40,
            core: 5,
            ..Default::default()
        })];

        let pool = derive_pool(&exercises, &battles);
        assert_eq!(pool.strike, 0);
        assert_eq!(pool.core, 0);
        assert_eq!(pool.total(), 0);
    }
}
