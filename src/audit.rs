//! Audit logging of authorization decisions and assignment events.
//!
//! The sink is fire-and-forget: recording never blocks and never fails the
//! primary operation. Implementations that hit trouble drop the event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types emitted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    AuthenticationFailure,
    AccessGranted,
    AccessDenied,
    OwnershipDenied,
    AssistantAssigned,
    AssignmentFailed,
}

/// Audit event outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Success,
    Failure,
}

/// A single audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event id.
    pub id: String,
    /// Type of event.
    pub event_type: AuditEventType,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Actor the event concerns, if one was resolved.
    pub actor_id: Option<String>,
    /// Event outcome.
    pub outcome: EventOutcome,
    /// Additional event details (entity, operation, assignee, reason, ...).
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    /// Create a new event with a fresh id and timestamp.
    pub fn new(event_type: AuditEventType, outcome: EventOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            actor_id: None,
            outcome,
            details: HashMap::new(),
        }
    }

    /// Set the actor.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Attach a detail key/value pair.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Sink for audit events. `record` must not block the caller and must not
/// surface errors; audit is best-effort by contract.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Sink that emits structured `tracing` events.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "orderdesk_core::audit",
            event_id = %event.id,
            event_type = ?event.event_type,
            actor = event.actor_id.as_deref().unwrap_or("-"),
            outcome = ?event.outcome,
            details = ?event.details,
            "audit event"
        );
    }
}

/// Sink that keeps events in memory, for tests and diagnostics.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Count of events of a given type.
    pub fn count_of(&self, event_type: AuditEventType) -> usize {
        self.events()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        // A poisoned lock means a panicking test; dropping the event is fine.
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_events() {
        let sink = MemoryAuditSink::new();
        sink.record(
            AuditEvent::new(AuditEventType::AccessDenied, EventOutcome::Failure)
                .with_actor("u1")
                .with_detail("entity", "orders"),
        );
        sink.record(AuditEvent::new(
            AuditEventType::AssistantAssigned,
            EventOutcome::Success,
        ));

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.count_of(AuditEventType::AccessDenied), 1);
        let denied = &sink.events()[0];
        assert_eq!(denied.actor_id.as_deref(), Some("u1"));
        assert_eq!(denied.details.get("entity").map(String::as_str), Some("orders"));
    }

    #[test]
    fn events_get_unique_ids() {
        let a = AuditEvent::new(AuditEventType::AccessGranted, EventOutcome::Success);
        let b = AuditEvent::new(AuditEventType::AccessGranted, EventOutcome::Success);
        assert_ne!(a.id, b.id);
    }
}
