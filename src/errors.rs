//! Error types for the workflow core.

use thiserror::Error;

/// Result type alias for the workflow core.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Main error type covering authentication, authorization, assignment and
/// storage failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credential was presented with the request.
    #[error("Missing credential")]
    MissingCredential,

    /// The credential was present but malformed or its signature did not
    /// verify.
    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    /// The credential was well-formed but has expired.
    #[error("Credential has expired")]
    ExpiredCredential,

    /// The credential resolved to a user id the directory does not know.
    #[error("Unknown user")]
    UnknownUser,

    /// The account exists but has been deactivated.
    #[error("Account is inactive")]
    InactiveAccount,

    /// The account carries a role the core does not recognize.
    #[error("Invalid role: '{role}'")]
    InvalidRole { role: String },

    /// The request carried no resolved identity at all. Distinct from
    /// `Forbidden`: the caller should re-authenticate, not escalate.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The resolved identity is not allowed to perform this operation.
    #[error("Forbidden: {operation} on {entity}")]
    Forbidden { entity: String, operation: String },

    /// Assignment engine errors.
    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),

    /// Storage-related errors.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal errors.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors produced by the round-robin assignment engine.
///
/// The two variants carry different retry semantics: `NoAvailableAssistants`
/// is a capacity/configuration problem (surface as temporarily unavailable),
/// while `PersistenceFailed` is an infrastructure fault the caller may retry
/// with backoff.
#[derive(Error, Debug)]
pub enum AssignmentError {
    #[error("No active assistants available for assignment")]
    NoAvailableAssistants,

    #[error("Failed to persist assignment rotation state: {message}")]
    PersistenceFailed { message: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Operation timed out: {message}")]
    Timeout { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl AuthError {
    /// Create an invalid credential error.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }

    /// Create an invalid role error.
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Create a forbidden error for an entity/operation pair.
    pub fn forbidden(entity: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Forbidden {
            entity: entity.into(),
            operation: operation.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors the caller can recover from by re-authenticating.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::InvalidCredential { .. }
                | Self::ExpiredCredential
                | Self::UnknownUser
                | Self::InactiveAccount
                | Self::InvalidRole { .. }
                | Self::Unauthenticated
        )
    }

    /// HTTP status hint for callers that translate core errors to
    /// responses. Authentication failures map to 401, authorization to 403,
    /// missing capacity to 503 (retryable), infrastructure faults to 500.
    pub fn http_status(&self) -> u16 {
        match self {
            e if e.is_authentication_failure() => 401,
            Self::Forbidden { .. } => 403,
            Self::Assignment(AssignmentError::NoAvailableAssistants) => 503,
            Self::Assignment(AssignmentError::PersistenceFailed { .. }) => 500,
            Self::Storage(_) | Self::Internal { .. } | Self::Json(_) => 500,
            _ => 400,
        }
    }
}

impl AssignmentError {
    /// Create a persistence failure from any displayable cause.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailed {
            message: message.into(),
        }
    }

    /// True if the caller may retry the assignment with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceFailed { .. })
    }
}

impl From<StorageError> for AssignmentError {
    fn from(error: StorageError) -> Self {
        Self::PersistenceFailed {
            message: error.to_string(),
        }
    }
}

impl StorageError {
    /// Create a new connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create a new operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a new serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}
