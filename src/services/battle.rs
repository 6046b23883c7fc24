// SPDX-License-Identifier: MIT

//! Battle resolution.
//!
//! Per-user encounter state machine: Idle -> Active -> Victory | Retreated.
//! An encounter lives only in memory while active; the persisted artifact
//! is the victory record written when the boss falls. Energy is deducted
//! per attack on the user record; power drain is committed through the
//! victory record, so a retreat discards the encounter's power spend.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{
    BattleOutcome, BattleRecord, Boss, PowerBucket, PowerSpent, Weakness,
};
use crate::services::progression::{self, VICTORY_EXPERIENCE};
use crate::services::{generate_id, Ledger, PowerPool, Roster};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// The three attack moves with fixed costs and damage multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Quick,
    Power,
    Special,
}

impl AttackKind {
    pub fn power_cost(self) -> u32 {
        match self {
            AttackKind::Quick => 10,
            AttackKind::Power => 30,
            AttackKind::Special => 50,
        }
    }

    pub fn energy_cost(self) -> u32 {
        match self {
            AttackKind::Quick => 5,
            AttackKind::Power => 15,
            AttackKind::Special => 25,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            AttackKind::Quick => 0.5,
            AttackKind::Power => 1.2,
            AttackKind::Special => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttackKind::Quick => "quick",
            AttackKind::Power => "power",
            AttackKind::Special => "special",
        }
    }

    /// The attack whose costs gate starting a battle at all.
    pub const CHEAPEST: AttackKind = AttackKind::Quick;
}

/// Damage for one attack: base multiplier rounded first, then the
/// weakness bonus applied and rounded again.
pub fn resolve_damage(spent: &PowerSpent, attack: AttackKind, weakness: Weakness) -> u32 {
    let base = (f64::from(spent.total()) * attack.multiplier()).round();
    let total = if spent.matches_weakness(weakness) {
        (base * 1.5).round()
    } else {
        base
    };
    total as u32
}

/// Drain `cost` power from the pool in fixed bucket order, or `None` if
/// the pool cannot cover it.
pub fn drain_pool(pool: &PowerPool, cost: u32) -> Option<PowerSpent> {
    if pool.total() < cost {
        return None;
    }

    let mut remaining = cost;
    let mut spent = PowerSpent::default();
    for bucket in [PowerBucket::Strike, PowerBucket::Core, PowerBucket::Force] {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(pool.bucket(bucket));
        *spent.bucket_mut(bucket) = take;
        remaining -= take;
    }
    Some(spent)
}

fn subtract_spent(mut pool: PowerPool, spent: &PowerSpent) -> PowerPool {
    pool.strike = pool.strike.saturating_sub(spent.strike);
    pool.core = pool.core.saturating_sub(spent.core);
    pool.force = pool.force.saturating_sub(spent.force);
    pool
}

/// An in-flight encounter. Exists only while Active.
#[derive(Debug, Clone)]
struct Encounter {
    boss: Boss,
    boss_health: u32,
    log: Vec<String>,
    spent: PowerSpent,
    damage_dealt: u32,
    started_at: String,
}

impl Encounter {
    fn view(&self) -> EncounterView {
        EncounterView {
            boss_id: self.boss.id.clone(),
            boss_name: self.boss.name.clone(),
            boss_health: self.boss_health,
            boss_max_health: self.boss.max_health,
            log: self.log.clone(),
            power_spent: self.spent,
            damage_dealt: self.damage_dealt,
            started_at: self.started_at.clone(),
        }
    }
}

/// Serializable snapshot of an active encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterView {
    pub boss_id: String,
    pub boss_name: String,
    pub boss_health: u32,
    pub boss_max_health: u32,
    pub log: Vec<String>,
    pub power_spent: PowerSpent,
    pub damage_dealt: u32,
    pub started_at: String,
}

/// Where the encounter stands after an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackOutcome {
    Ongoing,
    Victory,
}

/// Result of a resolved attack, for API responses.
#[derive(Debug, Serialize)]
pub struct AttackReport {
    pub attack: AttackKind,
    pub damage: u32,
    pub weakness_bonus: bool,
    pub boss_health: u32,
    pub outcome: AttackOutcome,
    /// Flavor only: nothing is deducted from the player
    pub counter_damage: Option<u32>,
    pub tier_advanced: bool,
    pub levels_gained: u32,
    /// Log entries appended by this attack
    pub log: Vec<String>,
}

/// Resolves battles for all users, holding the active encounters.
pub struct BattleResolver {
    store: Store,
    ledger: Ledger,
    roster: Arc<Roster>,
    encounters: DashMap<String, Encounter>,
}

impl BattleResolver {
    pub fn new(store: Store, roster: Arc<Roster>) -> Self {
        let ledger = Ledger::new(store.clone());
        Self {
            store,
            ledger,
            roster,
            encounters: DashMap::new(),
        }
    }

    /// Boss ids with a persisted victory record for this user.
    pub async fn defeated_bosses(&self, user_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .store
            .battles_by_user(user_id)
            .await?
            .into_iter()
            .filter(|b| b.result == BattleOutcome::Victory)
            .map(|b| b.boss_id)
            .collect())
    }

    /// Snapshot of the user's active encounter, if any.
    pub fn active(&self, user_id: &str) -> Option<EncounterView> {
        self.encounters.get(user_id).map(|e| e.view())
    }

    /// Start an encounter against a roster boss.
    pub async fn start(
        &self,
        user_id: &str,
        boss_id: &str,
        now: DateTime<Utc>,
    ) -> Result<EncounterView> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let boss = self
            .roster
            .get(boss_id)
            .ok_or_else(|| AppError::NotFound(format!("Boss {} not found", boss_id)))?;

        if self.encounters.contains_key(user_id) {
            return Err(AppError::Conflict(
                "A battle is already active".to_string(),
            ));
        }
        if boss.tier > user.tier + 1 {
            return Err(AppError::Validation(format!(
                "{} is beyond your tier",
                boss.name
            )));
        }

        let defeated = self.defeated_bosses(user_id).await?;
        if defeated.contains(boss_id) {
            return Err(AppError::Validation(format!(
                "{} is already defeated",
                boss.name
            )));
        }

        let pool = self.ledger.available(user_id).await?;
        let cheapest = AttackKind::CHEAPEST;
        if pool.total() < cheapest.power_cost() || user.energy < cheapest.energy_cost() {
            return Err(AppError::Validation(
                "Not enough power or energy to fight. Train first!".to_string(),
            ));
        }

        let encounter = Encounter {
            boss: boss.clone(),
            boss_health: boss.max_health,
            log: vec![format!("Battle with {} has begun!", boss.name)],
            spent: PowerSpent::default(),
            damage_dealt: 0,
            started_at: format_utc_rfc3339(now),
        };

        tracing::info!(user_id, boss_id, boss = %boss.name, "Battle started");

        let view = encounter.view();
        self.encounters.insert(user_id.to_string(), encounter);
        Ok(view)
    }

    /// Resolve one attack in the user's active encounter.
    pub async fn attack(
        &self,
        user_id: &str,
        attack: AttackKind,
        now: DateTime<Utc>,
    ) -> Result<AttackReport> {
        // Take the encounter out while resolving; reinsert unless the
        // encounter ended. The single-mutator model makes this safe.
        let (key, mut encounter) = self
            .encounters
            .remove(user_id)
            .ok_or_else(|| AppError::NotFound("No active battle".to_string()))?;

        match self.resolve_attack(user_id, attack, &mut encounter, now).await {
            Ok(report) => {
                if report.outcome == AttackOutcome::Ongoing {
                    self.encounters.insert(key, encounter);
                }
                Ok(report)
            }
            Err(e) => {
                self.encounters.insert(key, encounter);
                Err(e)
            }
        }
    }

    async fn resolve_attack(
        &self,
        user_id: &str,
        attack: AttackKind,
        encounter: &mut Encounter,
        now: DateTime<Utc>,
    ) -> Result<AttackReport> {
        let mut user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        // Validate both costs before touching anything
        let pool = subtract_spent(self.ledger.available(user_id).await?, &encounter.spent);
        let spent = drain_pool(&pool, attack.power_cost()).ok_or_else(|| {
            AppError::Validation(format!(
                "Not enough power for a {} attack",
                attack.label()
            ))
        })?;
        if user.energy < attack.energy_cost() {
            return Err(AppError::Validation(format!(
                "Not enough energy for a {} attack",
                attack.label()
            )));
        }

        user.energy -= attack.energy_cost();
        self.store.upsert_user(&user).await?;

        let weakness_bonus = spent.matches_weakness(encounter.boss.weakness);
        let damage = resolve_damage(&spent, attack, encounter.boss.weakness);

        encounter.spent.add(&spent);
        encounter.damage_dealt += damage;
        encounter.boss_health = encounter.boss_health.saturating_sub(damage);

        let mut log = vec![format!(
            "You used {} attack for {} damage!",
            attack.label(),
            damage
        )];

        if encounter.boss_health == 0 {
            log.push(format!("You defeated {}!", encounter.boss.name));
            encounter.log.extend(log.iter().cloned());

            let record = BattleRecord {
                id: generate_id(now),
                user_id: user_id.to_string(),
                boss_id: encounter.boss.id.clone(),
                recorded_at: format_utc_rfc3339(now),
                result: BattleOutcome::Victory,
                damage_dealt: encounter.damage_dealt,
                power_spent: encounter.spent,
            };
            self.store.add_battle(&record).await?;

            let levels_gained = progression::grant_experience(&mut user, VICTORY_EXPERIENCE);
            let defeated = self.defeated_bosses(user_id).await?;
            let tier_advanced =
                progression::evaluate_tier_advance(&mut user, &self.roster, &defeated);
            self.store.upsert_user(&user).await?;

            tracing::info!(
                user_id,
                boss_id = %encounter.boss.id,
                damage_dealt = encounter.damage_dealt,
                tier_advanced,
                "Boss defeated"
            );

            return Ok(AttackReport {
                attack,
                damage,
                weakness_bonus,
                boss_health: 0,
                outcome: AttackOutcome::Victory,
                counter_damage: None,
                tier_advanced,
                levels_gained,
                log,
            });
        }

        // Counter-attack is flavor text only; no player resource is touched
        let counter: u32 = rand::thread_rng().gen_range(5..15);
        log.push(format!(
            "{} counter-attacks for {} damage!",
            encounter.boss.name, counter
        ));
        encounter.log.extend(log.iter().cloned());

        Ok(AttackReport {
            attack,
            damage,
            weakness_bonus,
            boss_health: encounter.boss_health,
            outcome: AttackOutcome::Ongoing,
            counter_damage: Some(counter),
            tier_advanced: false,
            levels_gained: 0,
            log,
        })
    }

    /// Abandon the active encounter. Uncommitted power spend is discarded;
    /// energy already deducted per attack stays spent.
    pub fn retreat(&self, user_id: &str) -> Result<()> {
        self.encounters
            .remove(user_id)
            .ok_or_else(|| AppError::NotFound("No active battle".to_string()))?;
        tracing::info!(user_id, "Retreated from battle");
        Ok(())
    }
}
