//! Authorization guard and the per-request authorization context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::{AuditEvent, AuditEventType, AuditSink, EventOutcome};
use crate::errors::{AuthError, Result};
use crate::identity::{Identity, Role};
use crate::permissions::{self, Entity, Operation};

/// Scoping predicate an assistant's queries must satisfy: only resources
/// the assistant created are visible. Admin requests carry no filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipFilter {
    /// Required value of the resource's `created_by` field.
    pub created_by: String,
}

/// Immutable authorization outcome for one request. Produced by the guard,
/// handed to the downstream query builder, discarded at request end. It is
/// never attached to a shared request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    /// Acting user id.
    pub actor_id: String,

    /// Acting role.
    pub role: Role,

    /// Entity the request targets.
    pub entity: Entity,

    /// Operation the request performs.
    pub operation: Operation,

    /// Scoping filter, present only for assistants on ownership-scoped
    /// entities.
    pub ownership_filter: Option<OwnershipFilter>,
}

impl AuthorizationContext {
    /// True when queries must be scoped to the actor's own resources.
    pub fn is_scoped(&self) -> bool {
        self.ownership_filter.is_some()
    }
}

/// Decides allow/deny for each request and records every decision.
pub struct AuthorizationGuard {
    audit: Arc<dyn AuditSink>,
}

impl AuthorizationGuard {
    /// Create a guard with the given audit sink.
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    /// Authorize `identity` to perform `operation` on `entity`.
    ///
    /// A request without a resolved identity fails `Unauthenticated`,
    /// distinct from `Forbidden`. Every decision is audited before it is
    /// returned; a failing sink never blocks the decision.
    pub fn authorize(
        &self,
        identity: Option<&Identity>,
        entity: Entity,
        operation: Operation,
    ) -> Result<AuthorizationContext> {
        let Some(identity) = identity else {
            self.audit.record(
                AuditEvent::new(AuditEventType::AccessDenied, EventOutcome::Failure)
                    .with_detail("entity", entity.as_str())
                    .with_detail("operation", operation.as_str())
                    .with_detail("reason", "unauthenticated"),
            );
            return Err(AuthError::Unauthenticated);
        };

        if !permissions::is_allowed(identity.role, entity, operation) {
            self.audit.record(
                AuditEvent::new(AuditEventType::AccessDenied, EventOutcome::Failure)
                    .with_actor(&identity.id)
                    .with_detail("role", identity.role.as_str())
                    .with_detail("entity", entity.as_str())
                    .with_detail("operation", operation.as_str()),
            );
            return Err(AuthError::forbidden(entity.as_str(), operation.as_str()));
        }

        self.audit.record(
            AuditEvent::new(AuditEventType::AccessGranted, EventOutcome::Success)
                .with_actor(&identity.id)
                .with_detail("role", identity.role.as_str())
                .with_detail("entity", entity.as_str())
                .with_detail("operation", operation.as_str()),
        );

        let ownership_filter = self.ownership_filter(identity, entity);
        debug!(
            actor = %identity.id,
            role = %identity.role,
            entity = %entity,
            operation = %operation,
            scoped = ownership_filter.is_some(),
            "access granted"
        );

        Ok(AuthorizationContext {
            actor_id: identity.id.clone(),
            role: identity.role,
            entity,
            operation,
            ownership_filter,
        })
    }

    /// Authorize raw entity/operation names. Unknown names deny with
    /// `Forbidden`; they are never treated as admin-equivalent access.
    pub fn authorize_str(
        &self,
        identity: Option<&Identity>,
        entity: &str,
        operation: &str,
    ) -> Result<AuthorizationContext> {
        match (Entity::parse(entity), Operation::parse(operation)) {
            (Some(e), Some(o)) => self.authorize(identity, e, o),
            _ => {
                self.audit.record(
                    AuditEvent::new(AuditEventType::AccessDenied, EventOutcome::Failure)
                        .with_detail("entity", entity)
                        .with_detail("operation", operation)
                        .with_detail("reason", "unknown entity or operation"),
                );
                Err(AuthError::forbidden(entity, operation))
            }
        }
    }

    /// Compute the scoping filter for a role/entity pair.
    pub fn ownership_filter(&self, identity: &Identity, entity: Entity) -> Option<OwnershipFilter> {
        match identity.role {
            Role::Admin => None,
            Role::Assistant if entity.supports_ownership_scope() => Some(OwnershipFilter {
                created_by: identity.id.clone(),
            }),
            Role::Assistant => None,
        }
    }

    /// Check that `identity` may touch a resource owned by
    /// `resource_owner_id`. Denials are audited.
    pub fn check_ownership(&self, identity: &Identity, resource_owner_id: &str) -> bool {
        let allowed = permissions::check_ownership(identity.role, &identity.id, resource_owner_id);
        if !allowed {
            self.audit.record(
                AuditEvent::new(AuditEventType::OwnershipDenied, EventOutcome::Failure)
                    .with_actor(&identity.id)
                    .with_detail("resource_owner", resource_owner_id),
            );
        }
        allowed
    }
}
