//! Storage collaborator traits and in-memory implementations.
//!
//! The core never caches directory or settings state across calls; every
//! assignment re-reads the current pool and cursor through these traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::errors::{Result, StorageError};
use crate::identity::{Role, UserRecord};

/// Settings key under which the rotation cursor is persisted.
pub const ROTATION_CURSOR_KEY: &str = "lastAssignedAssistant";

/// A persisted setting record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key.
    pub key: String,

    /// Setting value.
    pub value: String,

    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
}

/// Read access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch active users with the given role, ordered by a stable key
    /// (creation time, id as tiebreaker). Determinism of this ordering is
    /// what keeps the assignment rotation fair.
    async fn find_active_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>, StorageError>;

    /// Look up a single user by id.
    async fn find_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, StorageError>;
}

/// Durable key-value settings with an atomic conditional update.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting.
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, StorageError>;

    /// Atomically replace `key` with `new_value` iff the current value
    /// equals `expected` (`None` meaning "absent"). Returns `false` when the
    /// expectation does not hold; the caller re-reads and retries.
    async fn compare_and_set_setting(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<bool, StorageError>;
}

/// In-memory user directory (for development/testing).
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: Arc<RwLock<Vec<UserRecord>>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record.
    pub async fn upsert_user(&self, record: UserRecord) {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter_mut().find(|u| u.id == record.id) {
            *existing = record;
        } else {
            users.push(record);
        }
    }

    /// Flip a user's active flag. No-op for unknown ids.
    pub async fn set_active(&self, id: &str, active: bool) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.active = active;
        }
    }

    /// Remove a user record.
    pub async fn remove_user(&self, id: &str) {
        self.users.write().await.retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_active_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>, StorageError> {
        let users = self.users.read().await;
        let mut matched: Vec<UserRecord> = users
            .iter()
            .filter(|u| u.active && u.role == role.as_str())
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, StorageError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

/// In-memory settings store. Compare-and-set runs under a single lock so
/// concurrent writers observe conflicts instead of silently overwriting.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    settings: Arc<Mutex<HashMap<String, Setting>>>,
}

impl MemorySettings {
    /// Create an empty settings store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally write a setting. Test/bootstrap helper.
    pub async fn put_setting(&self, key: &str, value: &str) {
        let mut settings = self.settings.lock().await;
        settings.insert(
            key.to_string(),
            Setting {
                key: key.to_string(),
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, StorageError> {
        let settings = self.settings.lock().await;
        Ok(settings.get(key).cloned())
    }

    async fn compare_and_set_setting(
        &self,
        key: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> Result<bool, StorageError> {
        let mut settings = self.settings.lock().await;
        let current = settings.get(key).map(|s| s.value.as_str());
        if current != expected {
            return Ok(false);
        }
        settings.insert(
            key.to_string(),
            Setting {
                key: key.to_string(),
                value: new_value.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_at(id: &str, role: Role, active: bool, offset_secs: i64) -> UserRecord {
        let mut record = UserRecord::new(id, role, active);
        record.created_at = Utc::now() + Duration::seconds(offset_secs);
        record
    }

    #[tokio::test]
    async fn directory_returns_active_assistants_in_creation_order() {
        let dir = MemoryDirectory::new();
        dir.upsert_user(record_at("c", Role::Assistant, true, 30)).await;
        dir.upsert_user(record_at("a", Role::Assistant, true, 10)).await;
        dir.upsert_user(record_at("b", Role::Assistant, true, 20)).await;
        dir.upsert_user(record_at("boss", Role::Admin, true, 0)).await;
        dir.upsert_user(record_at("gone", Role::Assistant, false, 5)).await;

        let pool = dir.find_active_users_by_role(Role::Assistant).await.unwrap();
        let ids: Vec<&str> = pool.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn cas_succeeds_only_when_expectation_holds() {
        let store = MemorySettings::new();

        // First write expects absence.
        assert!(store
            .compare_and_set_setting(ROTATION_CURSOR_KEY, None, "a")
            .await
            .unwrap());
        // Stale expectation loses.
        assert!(!store
            .compare_and_set_setting(ROTATION_CURSOR_KEY, None, "b")
            .await
            .unwrap());
        assert!(!store
            .compare_and_set_setting(ROTATION_CURSOR_KEY, Some("x"), "b")
            .await
            .unwrap());
        // Correct expectation wins.
        assert!(store
            .compare_and_set_setting(ROTATION_CURSOR_KEY, Some("a"), "b")
            .await
            .unwrap());

        let setting = store.get_setting(ROTATION_CURSOR_KEY).await.unwrap().unwrap();
        assert_eq!(setting.value, "b");
    }
}
