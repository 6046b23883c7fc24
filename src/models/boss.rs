//! Boss definitions.

use serde::{Deserialize, Serialize};

/// What a boss takes extra damage from.
///
/// `Endurance` exists for roster compatibility: running power converts to
/// energy rather than the spendable pool, so an endurance weakness never
/// triggers the damage bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weakness {
    Strike,
    Core,
    Force,
    Endurance,
    Balanced,
}

/// A boss in the roster. Current health lives on the active encounter,
/// and the defeated flag is derived from battle history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: String,
    pub name: String,
    /// Tier the boss belongs to, >= 1
    pub tier: u8,
    /// Health at the start of an encounter, > 0
    pub max_health: u32,
    pub weakness: Weakness,
    #[serde(default)]
    pub description: String,
}
