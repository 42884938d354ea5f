//! Configuration types for the workflow core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Token validation/issuing configuration.
    pub token: TokenConfig,

    /// Assignment engine configuration.
    pub assignment: AssignmentConfig,
}

/// Bearer token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HMAC secret for signing and validation (load from environment in
    /// production).
    pub secret: String,

    /// Required issuer claim.
    pub issuer: String,

    /// Lifetime applied to issued tokens.
    pub token_lifetime: Duration,

    /// Clock-skew leeway accepted during expiry validation.
    pub clock_skew: Duration,
}

/// Assignment engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentConfig {
    /// Upper bound on compare-and-set retries before the engine gives up
    /// and reports a persistence failure.
    pub max_cas_retries: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            assignment: AssignmentConfig::default(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_THIS_IN_PRODUCTION_USE_PROPER_KEY_MANAGEMENT".to_string(),
            issuer: "orderdesk".to_string(),
            token_lifetime: Duration::from_secs(3600),
            clock_skew: Duration::from_secs(30),
        }
    }
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self { max_cas_retries: 32 }
    }
}

impl CoreConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token signing secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.token.secret = secret.into();
        self
    }

    /// Set the token issuer.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.token.issuer = issuer.into();
        self
    }

    /// Set the issued-token lifetime.
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token.token_lifetime = lifetime;
        self
    }

    /// Set the CAS retry bound.
    pub fn max_cas_retries(mut self, retries: u32) -> Self {
        self.assignment.max_cas_retries = retries;
        self
    }
}
