//! Convenient re-exports for consumers of the core.
//!
//! ```rust
//! use orderdesk_core::prelude::*;
//! ```

pub use crate::assignment::AssignmentEngine;
pub use crate::audit::{AuditEvent, AuditEventType, AuditSink, EventOutcome};
pub use crate::auth::{Authenticator, TokenValidator};
pub use crate::authorization::{AuthorizationContext, AuthorizationGuard, OwnershipFilter};
pub use crate::config::CoreConfig;
pub use crate::credentials::Credential;
pub use crate::errors::{AssignmentError, AuthError, Result, StorageError};
pub use crate::identity::{Identity, Role, UserRecord};
pub use crate::permissions::{Entity, Operation};
pub use crate::response_filter::filter_response;
pub use crate::storage::{SettingsStore, UserDirectory};
