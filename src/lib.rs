/*!
# Orderdesk Core

Authorization and fair-assignment core for a two-role customer/order
workflow backend.

This crate is the library boundary consumed by an HTTP layer (out of
scope). It provides:

- A static role/permission matrix over `{admin, assistant} × {customers,
  orders, users, financial_data, messages} × {create, read, update, delete,
  search}`, checked exhaustively and failing closed for anything undefined.
- Bearer-token authentication resolving credentials to validated
  identities through a pluggable user directory.
- An authorization guard producing an immutable per-request
  [`AuthorizationContext`], including the ownership filter that scopes an
  assistant's queries to resources they created.
- Response filtering that strips financial fields from payloads for
  non-admin roles.
- A round-robin assignment engine that distributes new orders fairly
  across active assistants, with the rotation cursor persisted through an
  atomic compare-and-swap so concurrent order creation cannot skew the
  rotation.
- Best-effort audit logging of every authorization decision and
  assignment event.

## Quick Start

```rust,no_run
use std::sync::Arc;
use orderdesk_core::{
    AssignmentEngine, Authenticator, AuthorizationGuard, CoreConfig, Credential,
    Entity, MemoryDirectory, MemorySettings, Operation, Role, TokenValidator,
    TracingAuditSink, UserRecord, filter_response,
};

# #[tokio::main]
# async fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = CoreConfig::new().secret("load-me-from-the-environment");
let directory = Arc::new(MemoryDirectory::new());
let settings = Arc::new(MemorySettings::new());
let audit = Arc::new(TracingAuditSink);

directory.upsert_user(UserRecord::new("u1", Role::Assistant, true)).await;

let validator = TokenValidator::new(config.token.clone());
let authenticator = Authenticator::new(directory.clone(), validator.clone(), audit.clone());
let guard = AuthorizationGuard::new(audit.clone());
let engine = AssignmentEngine::new(directory, settings, audit, config.assignment.clone());

// Inbound request: authenticate, authorize, assign, filter.
let token = validator.issue("u1")?;
let identity = authenticator.authenticate(Some(&Credential::bearer(token))).await?;
let ctx = guard.authorize(Some(&identity), Entity::Orders, Operation::Create)?;
let assignee = engine.assign_next_assistant().await?;
let body = filter_response(serde_json::json!({"id": "o1", "price": 100}), ctx.role);
# let _ = (assignee, body);
# Ok(())
# }
```
*/

pub mod assignment;
pub mod audit;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod identity;
pub mod permissions;
pub mod prelude;
pub mod response_filter;
pub mod storage;

pub use assignment::AssignmentEngine;
pub use audit::{
    AuditEvent, AuditEventType, AuditSink, EventOutcome, MemoryAuditSink, NoopAuditSink,
    TracingAuditSink,
};
pub use auth::{AccessClaims, Authenticator, TokenValidator};
pub use authorization::{AuthorizationContext, AuthorizationGuard, OwnershipFilter};
pub use config::{AssignmentConfig, CoreConfig, TokenConfig};
pub use credentials::Credential;
pub use errors::{AssignmentError, AuthError, Result, StorageError};
pub use identity::{Identity, Role, UserRecord};
pub use permissions::{check_ownership, is_allowed, is_allowed_str, Entity, Operation};
pub use response_filter::{filter_response, FINANCIAL_FIELDS};
pub use storage::{
    MemoryDirectory, MemorySettings, Setting, SettingsStore, UserDirectory, ROTATION_CURSOR_KEY,
};
