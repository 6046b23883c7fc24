// SPDX-License-Identifier: MIT

//! Boss roster loading and lookup.

use crate::models::{Boss, Weakness};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The boss roster, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Roster {
    bosses: Vec<Boss>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Roster {
    /// Load a roster from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| RosterError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load a roster from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, RosterError> {
        let bosses: Vec<Boss> =
            serde_json::from_str(json_data).map_err(|e| RosterError::ParseError(e.to_string()))?;
        Self::from_bosses(bosses)
    }

    fn from_bosses(bosses: Vec<Boss>) -> Result<Self, RosterError> {
        if bosses.is_empty() {
            return Err(RosterError::Invalid("roster is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for boss in &bosses {
            if boss.tier == 0 {
                return Err(RosterError::Invalid(format!(
                    "boss {} has tier 0; tiers start at 1",
                    boss.id
                )));
            }
            if boss.max_health == 0 {
                return Err(RosterError::Invalid(format!(
                    "boss {} has zero health",
                    boss.id
                )));
            }
            if !seen.insert(boss.id.clone()) {
                return Err(RosterError::Invalid(format!(
                    "duplicate boss id {}",
                    boss.id
                )));
            }
        }

        tracing::info!(count = bosses.len(), "Loaded boss roster");
        Ok(Self { bosses })
    }

    /// The built-in roster: the four tier-1 bosses plus the higher tiers.
    pub fn builtin() -> Self {
        let bosses = vec![
            boss("boss1", "Training Dummy", 1, 100, Weakness::Strike, "Stands very still. Ideal first opponent."),
            boss("boss2", "Fitness Goblin", 1, 200, Weakness::Core, "Hoards stolen gym equipment."),
            boss("boss3", "Cardio Crusher", 1, 300, Weakness::Endurance, "Never out of breath."),
            boss("boss4", "Tier 1 Champion", 1, 500, Weakness::Balanced, "Gatekeeper of the novice circuit."),
            boss("boss5", "Dumbbell Ogre", 2, 800, Weakness::Force, "Swings a dumbbell the size of a door."),
            boss("boss6", "Treadmill Wraith", 2, 1000, Weakness::Strike, "Haunts the cardio floor after closing."),
            boss("boss7", "Tier 2 Champion", 2, 1500, Weakness::Balanced, "Undefeated in the regional league."),
            boss("boss8", "Iron Colossus", 3, 2500, Weakness::Core, "A walking weight stack."),
            boss("boss9", "Marathon Phantom", 3, 3000, Weakness::Force, "Forty-two kilometers of grudge."),
            boss("boss10", "Tier 3 Champion", 3, 4000, Weakness::Balanced, "One fight away from the top."),
            boss("boss11", "Overtraining Incarnate", 4, 6000, Weakness::Strike, "The consequence of skipping rest days."),
            boss("boss12", "The Undefeated", 4, 8000, Weakness::Balanced, "Nobody remembers their name. Everybody remembers losing."),
        ];

        Self { bosses }
    }

    /// Every boss in the roster.
    pub fn bosses(&self) -> &[Boss] {
        &self.bosses
    }

    /// Look up a boss by id.
    pub fn get(&self, id: &str) -> Option<&Boss> {
        self.bosses.iter().find(|b| b.id == id)
    }

    /// All bosses of one tier.
    pub fn bosses_in_tier(&self, tier: u8) -> Vec<&Boss> {
        self.bosses.iter().filter(|b| b.tier == tier).collect()
    }
}

fn boss(id: &str, name: &str, tier: u8, max_health: u32, weakness: Weakness, desc: &str) -> Boss {
    Boss {
        id: id.to_string(),
        name: name.to_string(),
        tier,
        max_health,
        weakness,
        description: desc.to_string(),
    }
}

/// Errors from roster loading.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse roster JSON: {0}")]
    ParseError(String),

    #[error("Invalid roster: {0}")]
    Invalid(String),
}
