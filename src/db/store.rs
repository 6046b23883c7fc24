// SPDX-License-Identifier: MIT

//! Local record store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (the singleton hero profile)
//! - Exercises (append-only workout history)
//! - Battles (append-only encounter history)
//!
//! The store keeps everything in memory and, when opened with a snapshot
//! path, rewrites a JSON snapshot file after every mutation. A single local
//! user is the only mutator, so snapshot-on-write is cheap and keeps the
//! on-disk format trivially inspectable.

use crate::error::AppError;
use crate::models::{BattleRecord, Exercise, User};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Snapshot format version (increment when the format changes).
const SNAPSHOT_VERSION: u32 = 1;

/// On-disk snapshot of the full store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    exercises: Vec<Exercise>,
    #[serde(default)]
    battles: Vec<BattleRecord>,
}

struct StoreInner {
    users: DashMap<String, User>,
    exercises: DashMap<String, Exercise>,
    battles: DashMap<String, BattleRecord>,
    /// Snapshot file; `None` keeps the store volatile (tests, dev)
    snapshot_path: Option<PathBuf>,
    /// Serializes snapshot writes
    write_guard: tokio::sync::Mutex<()>,
}

/// Record store handle. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    inner: Option<Arc<StoreInner>>,
}

impl Store {
    /// Create a volatile in-memory store.
    pub fn in_memory() -> Self {
        Self {
            inner: Some(Arc::new(StoreInner {
                users: DashMap::new(),
                exercises: DashMap::new(),
                battles: DashMap::new(),
                snapshot_path: None,
                write_guard: tokio::sync::Mutex::new(()),
            })),
        }
    }

    /// Open a store backed by a JSON snapshot file, loading existing data.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes).map_err(|e| {
                AppError::Database(format!("Corrupt snapshot {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read snapshot {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let inner = StoreInner {
            users: snapshot.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            exercises: snapshot
                .exercises
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
            battles: snapshot
                .battles
                .into_iter()
                .map(|b| (b.id.clone(), b))
                .collect(),
            snapshot_path: Some(path.clone()),
            write_guard: tokio::sync::Mutex::new(()),
        };

        tracing::info!(
            path = %path.display(),
            users = inner.users.len(),
            exercises = inner.exercises.len(),
            battles = inner.battles.len(),
            "Store opened"
        );

        Ok(Self {
            inner: Some(Arc::new(inner)),
        })
    }

    /// Create a store where every operation fails (for error-path tests).
    pub fn offline() -> Self {
        Self { inner: None }
    }

    /// Helper to get the inner state or return an error if offline.
    fn get_inner(&self) -> Result<&Arc<StoreInner>, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::Database("Store not available (offline mode)".to_string()))
    }

    /// Rewrite the snapshot file if this store is persistent.
    async fn persist(&self) -> Result<(), AppError> {
        let inner = self.get_inner()?;
        let Some(path) = &inner.snapshot_path else {
            return Ok(());
        };

        let _guard = inner.write_guard.lock().await;

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            users: inner.users.iter().map(|e| e.value().clone()).collect(),
            exercises: inner.exercises.iter().map(|e| e.value().clone()).collect(),
            battles: inner.battles.iter().map(|e| e.value().clone()).collect(),
        };

        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| AppError::Database(format!("Failed to serialize snapshot: {}", e)))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(path, bytes).await.map_err(|e| {
            AppError::Database(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.get_inner()?.users.get(user_id).map(|u| u.clone()))
    }

    /// List all users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .get_inner()?
            .users
            .iter()
            .map(|e| e.value().clone())
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.get_inner()?
            .users
            .insert(user.id.clone(), user.clone());
        self.persist().await
    }

    // ─── Exercise Operations ─────────────────────────────────────

    /// Append an exercise record.
    pub async fn add_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        self.get_inner()?
            .exercises
            .insert(exercise.id.clone(), exercise.clone());
        self.persist().await
    }

    /// All exercises for a user, oldest first.
    pub async fn exercises_by_user(&self, user_id: &str) -> Result<Vec<Exercise>, AppError> {
        let mut exercises: Vec<Exercise> = self
            .get_inner()?
            .exercises
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        exercises.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(exercises)
    }

    /// Exercises for a user on a specific day.
    pub async fn exercises_by_user_and_date(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<Exercise>, AppError> {
        let mut exercises: Vec<Exercise> = self
            .get_inner()?
            .exercises
            .iter()
            .filter(|e| e.value().user_id == user_id && e.value().date == date)
            .map(|e| e.value().clone())
            .collect();
        exercises.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(exercises)
    }

    /// Exercises for a user within an inclusive day-key range.
    ///
    /// Day keys are `YYYY-MM-DD`, so plain string comparison orders them.
    pub async fn exercises_by_user_and_date_range(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<Exercise>, AppError> {
        let mut exercises: Vec<Exercise> = self
            .get_inner()?
            .exercises
            .iter()
            .filter(|e| {
                let ex = e.value();
                ex.user_id == user_id && ex.date.as_str() >= start && ex.date.as_str() <= end
            })
            .map(|e| e.value().clone())
            .collect();
        exercises.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(exercises)
    }

    // ─── Battle Operations ───────────────────────────────────────

    /// Append a battle record.
    pub async fn add_battle(&self, record: &BattleRecord) -> Result<(), AppError> {
        self.get_inner()?
            .battles
            .insert(record.id.clone(), record.clone());
        self.persist().await
    }

    /// All battle records for a user, oldest first.
    pub async fn battles_by_user(&self, user_id: &str) -> Result<Vec<BattleRecord>, AppError> {
        let mut battles: Vec<BattleRecord> = self
            .get_inner()?
            .battles
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        battles.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(battles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseKind, User};

    fn make_exercise(id: &str, user_id: &str, date: &str) -> Exercise {
        Exercise {
            id: id.to_string(),
            user_id: user_id.to_string(),
            kind: ExerciseKind::Pushup,
            count: 10.0,
            date: date.to_string(),
            recorded_at: format!("{}T10:00:00Z", date),
            power_generated: 12,
            form_quality: 0.8,
        }
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let store = Store::in_memory();
        let user = User::new("u1".into(), "Hero".into(), "2024-01-01T00:00:00Z".into());

        store.upsert_user(&user).await.unwrap();
        let loaded = store.get_user("u1").await.unwrap().unwrap();

        assert_eq!(loaded.name, "Hero");
        assert_eq!(loaded.energy, loaded.max_energy);
    }

    #[tokio::test]
    async fn test_exercise_date_queries() {
        let store = Store::in_memory();
        store
            .add_exercise(&make_exercise("e1", "u1", "2024-01-10"))
            .await
            .unwrap();
        store
            .add_exercise(&make_exercise("e2", "u1", "2024-01-12"))
            .await
            .unwrap();
        store
            .add_exercise(&make_exercise("e3", "u2", "2024-01-12"))
            .await
            .unwrap();

        let day = store
            .exercises_by_user_and_date("u1", "2024-01-12")
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].id, "e2");

        let range = store
            .exercises_by_user_and_date_range("u1", "2024-01-01", "2024-01-31")
            .await
            .unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].id, "e1"); // oldest first

        let range = store
            .exercises_by_user_and_date_range("u1", "2024-01-11", "2024-01-11")
            .await
            .unwrap();
        assert!(range.is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_errors() {
        let store = Store::offline();
        let err = store.get_user("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join(format!("herofit-store-{}", std::process::id()));
        let path = dir.join("snapshot.json");
        let _ = tokio::fs::remove_file(&path).await;

        {
            let store = Store::open(&path).await.unwrap();
            let user = User::new("u1".into(), "Hero".into(), "2024-01-01T00:00:00Z".into());
            store.upsert_user(&user).await.unwrap();
            store
                .add_exercise(&make_exercise("e1", "u1", "2024-01-10"))
                .await
                .unwrap();
        }

        let reopened = Store::open(&path).await.unwrap();
        assert!(reopened.get_user("u1").await.unwrap().is_some());
        assert_eq!(reopened.exercises_by_user("u1").await.unwrap().len(), 1);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
