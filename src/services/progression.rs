// SPDX-License-Identifier: MIT

//! Tier and level progression rules.
//!
//! Two separate axes: tiers advance by clearing every boss of the next
//! tier, levels advance by accumulated experience. Both raise energy
//! capacity and refill energy.

use crate::models::User;
use crate::services::Roster;
use std::collections::HashSet;

/// Energy capacity gained per tier advance.
pub const TIER_ENERGY_BONUS: u32 = 50;
/// Energy capacity gained per level-up.
pub const LEVEL_ENERGY_BONUS: u32 = 10;
/// Flat experience award for a boss victory.
pub const VICTORY_EXPERIENCE: u64 = 100;

/// Title for a tier. Tiers past the table keep the final title.
pub fn hero_title(tier: u8) -> &'static str {
    match tier {
        0 => "Beginner",
        1 => "Novice Hero",
        2 => "Rising Hero",
        3 => "Elite Hero",
        _ => "One Punch Hero",
    }
}

/// Experience needed to advance from `level` to `level + 1`.
pub fn required_xp(level: u32) -> u64 {
    (100.0 * 1.2f64.powi(level as i32 - 1)).floor() as u64
}

/// Cumulative experience at which `level` is left behind.
///
/// Experience never resets, so the threshold for each level is the
/// running sum of per-level requirements.
pub fn xp_threshold(level: u32) -> u64 {
    (1..=level).map(required_xp).sum()
}

/// Add experience and apply any level-ups crossed.
///
/// Returns the number of levels gained.
pub fn grant_experience(user: &mut User, amount: u64) -> u32 {
    user.experience += amount;

    let mut gained = 0;
    while user.experience >= xp_threshold(user.level) {
        user.level += 1;
        user.max_energy += LEVEL_ENERGY_BONUS;
        user.energy = user.max_energy;
        gained += 1;
    }

    if gained > 0 {
        tracing::info!(
            user_id = %user.id,
            level = user.level,
            experience = user.experience,
            "Level up"
        );
    }

    gained
}

/// Advance the tier if every boss of the next tier has a victory record.
///
/// Returns true when the tier advanced. A tier with no bosses is terminal.
pub fn evaluate_tier_advance(user: &mut User, roster: &Roster, defeated: &HashSet<String>) -> bool {
    let next_tier = user.tier + 1;
    let tier_bosses = roster.bosses_in_tier(next_tier);

    if tier_bosses.is_empty() {
        return false;
    }
    if !tier_bosses.iter().all(|b| defeated.contains(&b.id)) {
        return false;
    }

    user.tier = next_tier;
    user.hero_title = hero_title(next_tier).to_string();
    user.max_energy += TIER_ENERGY_BONUS;
    user.energy = user.max_energy;

    tracing::info!(
        user_id = %user.id,
        tier = user.tier,
        title = %user.hero_title,
        "Tier advanced"
    );

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        User::new("u1".into(), "Hero".into(), "2024-01-01T00:00:00Z".into())
    }

    #[test]
    fn test_required_xp_curve() {
        assert_eq!(required_xp(1), 100);
        assert_eq!(required_xp(2), 120);
        assert_eq!(required_xp(3), 144);
        // floor(100 * 1.2^3) = floor(172.8)
        assert_eq!(required_xp(4), 172);
    }

    #[test]
    fn test_grant_experience_levels_up_with_refill() {
        let mut user = make_user();
        user.energy = 10;

        let gained = grant_experience(&mut user, 100);

        assert_eq!(gained, 1);
        assert_eq!(user.level, 2);
        assert_eq!(user.max_energy, 110);
        assert_eq!(user.energy, 110);
        assert_eq!(user.experience, 100);
    }

    #[test]
    fn test_grant_experience_crosses_multiple_levels() {
        let mut user = make_user();

        // 100 + 120 = 220 reaches level 3 exactly
        let gained = grant_experience(&mut user, 220);

        assert_eq!(gained, 2);
        assert_eq!(user.level, 3);
        assert_eq!(user.max_energy, 120);
    }

    #[test]
    fn test_grant_experience_below_threshold() {
        let mut user = make_user();
        let gained = grant_experience(&mut user, 99);
        assert_eq!(gained, 0);
        assert_eq!(user.level, 1);
        assert_eq!(user.experience, 99);
    }

    #[test]
    fn test_tier_advance_requires_full_clear() {
        let roster = Roster::builtin();
        let mut user = make_user();

        let mut defeated: HashSet<String> =
            ["boss1", "boss2", "boss3"].iter().map(|s| s.to_string()).collect();
        assert!(!evaluate_tier_advance(&mut user, &roster, &defeated));
        assert_eq!(user.tier, 0);

        defeated.insert("boss4".to_string());
        assert!(evaluate_tier_advance(&mut user, &roster, &defeated));
        assert_eq!(user.tier, 1);
        assert_eq!(user.hero_title, "Novice Hero");
        assert_eq!(user.max_energy, 150);
        assert_eq!(user.energy, 150);

        // Running it again must not advance twice on the same clear
        assert!(!evaluate_tier_advance(&mut user, &roster, &defeated));
        assert_eq!(user.tier, 1);
    }

    #[test]
    fn test_tier_without_bosses_is_terminal() {
        let roster = Roster::builtin();
        let mut user = make_user();
        user.tier = 4;

        let defeated: HashSet<String> =
            roster.bosses().iter().map(|b| b.id.clone()).collect();
        assert!(!evaluate_tier_advance(&mut user, &roster, &defeated));
        assert_eq!(user.tier, 4);
    }

    #[test]
    fn test_hero_titles() {
        assert_eq!(hero_title(0), "Beginner");
        assert_eq!(hero_title(1), "Novice Hero");
        assert_eq!(hero_title(4), "One Punch Hero");
    }
}
