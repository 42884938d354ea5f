//! Identity and role types resolved by the authenticator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// The two recognized roles. Role is the sole axis of privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Assistant,
}

impl Role {
    /// String form used in storage and audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Assistant => "assistant",
        }
    }

    /// True for the fully privileged role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "assistant" => Ok(Role::Assistant),
            other => Err(AuthError::invalid_role(other)),
        }
    }
}

/// Raw user row as the directory stores it. The role is an uninterpreted
/// string here; the authenticator rejects unrecognized values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// User id.
    pub id: String,

    /// Role name as stored ("admin", "assistant", or anything legacy).
    pub role: String,

    /// Whether the account may authenticate and receive assignments.
    pub active: bool,

    /// Registration timestamp; the stable ordering key for assignment pools.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a record with the current timestamp.
    pub fn new(id: impl Into<String>, role: Role, active: bool) -> Self {
        Self {
            id: id.into(),
            role: role.as_str().to_string(),
            active,
            created_at: Utc::now(),
        }
    }
}

/// A resolved, validated identity. Produced by the authenticator once per
/// request; never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id.
    pub id: String,

    /// Validated role.
    pub role: Role,

    /// Active flag at resolution time.
    pub active: bool,
}

impl Identity {
    /// Create a new identity.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            active: true,
        }
    }
}
