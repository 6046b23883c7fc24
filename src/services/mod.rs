// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod battle;
pub mod ledger;
pub mod progression;
pub mod recorder;
pub mod rep_counter;
pub mod roster;

pub use battle::{AttackKind, BattleResolver, EncounterView};
pub use ledger::{Ledger, PowerPool};
pub use recorder::Recorder;
pub use rep_counter::{Landmark, RepTracker};
pub use roster::Roster;

use crate::db::Store;
use crate::error::Result;
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Build an opaque record id: millisecond timestamp plus a random suffix.
///
/// Practical collision avoidance only; there is exactly one writer.
pub(crate) fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    format!("{:x}{:06x}", now.timestamp_millis(), suffix)
}

/// Fetch the installation's singleton user, creating it on first start.
pub async fn ensure_default_user(store: &Store, name: &str, now: DateTime<Utc>) -> Result<User> {
    let users = store.list_users().await?;
    if let Some(user) = users.into_iter().next() {
        return Ok(user);
    }

    let user = User::new(
        generate_id(now),
        name.to_string(),
        format_utc_rfc3339(now),
    );
    store.upsert_user(&user).await?;
    tracing::info!(user_id = %user.id, name, "Created hero profile");
    Ok(user)
}
