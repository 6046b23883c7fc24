//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// The singleton hero profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque id (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Level (>= 1), advanced by accumulated experience
    pub level: u32,
    /// Cosmetic tier (0-4), advanced by clearing boss tiers
    pub tier: u8,
    /// Accumulated experience, never reset
    pub experience: u64,
    /// Spendable energy, always within 0..=max_energy
    pub energy: u32,
    /// Energy capacity; grows on level-up and tier-up
    pub max_energy: u32,
    /// Title derived from tier
    pub hero_title: String,
    /// Cosmetic customization
    pub avatar: AvatarCustomization,
    /// Daily training targets
    pub daily_goals: DailyGoals,
    /// Consecutive workout days (increment-only)
    pub current_streak: u32,
    /// Best streak ever reached
    pub longest_streak: u32,
    /// Day key (`YYYY-MM-DD`) of the most recent recorded exercise
    pub last_workout_date: Option<String>,
    /// When the user was created (RFC 3339)
    pub created_at: String,
    /// Last login timestamp (RFC 3339)
    pub last_login: String,
}

/// Starting energy capacity for a fresh hero.
pub const BASE_MAX_ENERGY: u32 = 100;

impl User {
    /// Build a fresh level-1, tier-0 user.
    pub fn new(id: String, name: String, now: String) -> Self {
        Self {
            id,
            name,
            level: 1,
            tier: 0,
            experience: 0,
            energy: BASE_MAX_ENERGY,
            max_energy: BASE_MAX_ENERGY,
            hero_title: "Beginner".to_string(),
            avatar: AvatarCustomization::default(),
            daily_goals: DailyGoals::default(),
            current_streak: 0,
            longest_streak: 0,
            last_workout_date: None,
            created_at: now.clone(),
            last_login: now,
        }
    }

    /// Add energy, capped at capacity.
    pub fn grant_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }
}

/// Cosmetic avatar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarCustomization {
    pub costume: String,
    pub color: String,
}

impl Default for AvatarCustomization {
    fn default() -> Self {
        Self {
            costume: "basic".to_string(),
            color: "blue".to_string(),
        }
    }
}

/// Daily training targets shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGoals {
    pub pushups: u32,
    pub situps: u32,
    pub squats: u32,
    pub run_km: f64,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            pushups: 100,
            situps: 100,
            squats: 100,
            run_km: 10.0,
        }
    }
}
