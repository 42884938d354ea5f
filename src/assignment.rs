//! Round-robin assignment of new orders to active assistants.
//!
//! The rotation cursor (the id of the last assistant assigned) is the only
//! durable state. Each call re-reads the active pool and the cursor, picks
//! the successor, and persists the choice with a compare-and-swap so that
//! two concurrent assignments can never both advance from the same cursor.
//! A lost CAS means another request won the slot; the loser re-reads and
//! takes the next one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::audit::{AuditEvent, AuditEventType, AuditSink, EventOutcome};
use crate::config::AssignmentConfig;
use crate::errors::AssignmentError;
use crate::identity::{Role, UserRecord};
use crate::storage::{SettingsStore, UserDirectory, ROTATION_CURSOR_KEY};

/// Fair round-robin assignment engine.
pub struct AssignmentEngine {
    directory: Arc<dyn UserDirectory>,
    settings: Arc<dyn SettingsStore>,
    audit: Arc<dyn AuditSink>,
    config: AssignmentConfig,
}

impl AssignmentEngine {
    /// Create an engine.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        settings: Arc<dyn SettingsStore>,
        audit: Arc<dyn AuditSink>,
        config: AssignmentConfig,
    ) -> Self {
        Self {
            directory,
            settings,
            audit,
            config,
        }
    }

    /// Pick the assistant who should receive the next order and durably
    /// advance the rotation cursor to them.
    ///
    /// Pool membership and cursor are re-read on every attempt, never
    /// cached across calls, so assistants added or removed between orders
    /// are picked up immediately. An empty pool is
    /// [`AssignmentError::NoAvailableAssistants`]; every storage fault and
    /// CAS-retry exhaustion is [`AssignmentError::PersistenceFailed`].
    pub async fn assign_next_assistant(&self) -> Result<String, AssignmentError> {
        let result = self.try_assign().await;
        match &result {
            Ok(assistant_id) => {
                self.audit.record(
                    AuditEvent::new(AuditEventType::AssistantAssigned, EventOutcome::Success)
                        .with_actor(assistant_id.clone()),
                );
            }
            Err(error) => {
                self.audit.record(
                    AuditEvent::new(AuditEventType::AssignmentFailed, EventOutcome::Failure)
                        .with_detail("reason", error.to_string()),
                );
            }
        }
        result
    }

    async fn try_assign(&self) -> Result<String, AssignmentError> {
        for attempt in 0..self.config.max_cas_retries {
            let pool = self
                .directory
                .find_active_users_by_role(Role::Assistant)
                .await?;
            if pool.is_empty() {
                return Err(AssignmentError::NoAvailableAssistants);
            }

            let cursor = self.settings.get_setting(ROTATION_CURSOR_KEY).await?;
            let expected = cursor.as_ref().map(|s| s.value.as_str());
            let selected = next_in_rotation(&pool, expected).to_string();

            if self
                .settings
                .compare_and_set_setting(ROTATION_CURSOR_KEY, expected, &selected)
                .await?
            {
                debug!(assistant = %selected, attempt, "assigned next assistant");
                return Ok(selected);
            }

            debug!(attempt, "rotation cursor moved concurrently, retrying");
        }

        warn!(
            retries = self.config.max_cas_retries,
            "rotation cursor contention exhausted retry budget"
        );
        Err(AssignmentError::persistence(
            "compare-and-set retries exhausted under contention",
        ))
    }
}

/// Pick the successor of `cursor` within `pool`.
///
/// A missing cursor, or one pointing at an assistant no longer in the pool,
/// resets the rotation to the first member rather than erroring. Index
/// arithmetic is modular over the current pool size, recomputed fresh every
/// call.
fn next_in_rotation<'a>(pool: &'a [UserRecord], cursor: Option<&str>) -> &'a str {
    debug_assert!(!pool.is_empty());
    if pool.len() == 1 {
        return &pool[0].id;
    }
    match cursor.and_then(|id| pool.iter().position(|u| u.id == id)) {
        Some(index) => &pool[(index + 1) % pool.len()].id,
        None => &pool[0].id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(ids: &[&str]) -> Vec<UserRecord> {
        ids.iter()
            .map(|id| UserRecord::new(*id, Role::Assistant, true))
            .collect()
    }

    #[test]
    fn no_cursor_selects_first() {
        assert_eq!(next_in_rotation(&pool(&["a", "b", "c"]), None), "a");
    }

    #[test]
    fn cursor_advances_and_wraps() {
        let p = pool(&["a", "b", "c"]);
        assert_eq!(next_in_rotation(&p, Some("a")), "b");
        assert_eq!(next_in_rotation(&p, Some("b")), "c");
        assert_eq!(next_in_rotation(&p, Some("c")), "a");
    }

    #[test]
    fn stale_cursor_resets_to_first() {
        assert_eq!(next_in_rotation(&pool(&["a", "b", "c"]), Some("x")), "a");
    }

    #[test]
    fn single_member_pool_always_selected() {
        let p = pool(&["only"]);
        assert_eq!(next_in_rotation(&p, None), "only");
        assert_eq!(next_in_rotation(&p, Some("only")), "only");
        assert_eq!(next_in_rotation(&p, Some("gone")), "only");
    }
}
