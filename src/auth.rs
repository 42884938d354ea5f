//! Bearer-credential authentication.
//!
//! `authenticate` performs a fixed sequence of short-circuiting checks:
//! credential presence, token validity/expiry, directory lookup, active
//! flag, recognized role. Later checks never run once an earlier one has
//! failed, so a deactivated account is rejected even when it presents a
//! structurally valid, unexpired token.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::{AuditEvent, AuditEventType, AuditSink, EventOutcome};
use crate::config::TokenConfig;
use crate::credentials::Credential;
use crate::errors::{AuthError, Result};
use crate::identity::{Identity, Role};
use crate::storage::UserDirectory;

/// Claims carried by an access token. The role is deliberately absent: it
/// is resolved from the user directory on every request, so role changes
/// and deactivations take effect without waiting for token expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Expiry (unix seconds).
    pub exp: i64,

    /// Issued-at (unix seconds).
    pub iat: i64,
}

/// Issues and validates HS256 bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: TokenConfig,
}

impl TokenValidator {
    /// Create a validator from token configuration.
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Mint a token for a user id using the configured lifetime.
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            exp: now + self.config.token_lifetime.as_secs() as i64,
            iat: now,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| AuthError::internal(format!("token encoding failed: {e}")))
    }

    /// Mint an already-expired token. Test helper for expiry paths.
    pub fn issue_expired(&self, user_id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let skew = self.config.clock_skew.as_secs() as i64;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            exp: now - skew - 3600,
            iat: now - skew - 7200,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| AuthError::internal(format!("token encoding failed: {e}")))
    }

    /// Validate a token, distinguishing expiry from every other defect.
    pub fn decode(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.leeway = self.config.clock_skew.as_secs();
        validation.validate_exp = true;

        match decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthError::ExpiredCredential)
                }
                _ => Err(AuthError::invalid_credential(e.to_string())),
            },
        }
    }
}

/// Resolves bearer credentials to validated identities.
pub struct Authenticator {
    directory: Arc<dyn UserDirectory>,
    validator: TokenValidator,
    audit: Arc<dyn AuditSink>,
}

impl Authenticator {
    /// Create an authenticator.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        validator: TokenValidator,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            directory,
            validator,
            audit,
        }
    }

    /// Authenticate a credential to an [`Identity`].
    ///
    /// The identity record is read, never mutated. Failures are audited
    /// best-effort and returned as typed errors; nothing is swallowed.
    pub async fn authenticate(&self, credential: Option<&Credential>) -> Result<Identity> {
        match self.resolve(credential).await {
            Ok(identity) => Ok(identity),
            Err(error) => {
                self.audit.record(
                    AuditEvent::new(AuditEventType::AuthenticationFailure, EventOutcome::Failure)
                        .with_detail("reason", error.to_string()),
                );
                Err(error)
            }
        }
    }

    async fn resolve(&self, credential: Option<&Credential>) -> Result<Identity> {
        // 1. Presence.
        let Credential::Bearer { token } = credential.ok_or(AuthError::MissingCredential)?;

        // 2. Well-formedness, signature, expiry.
        let claims = self.validator.decode(token)?;

        // 3. Existence in the directory.
        let record = self
            .directory
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        // 4. Active flag.
        if !record.active {
            return Err(AuthError::InactiveAccount);
        }

        // 5. Recognized role.
        let role = Role::from_str(&record.role)?;

        debug!(user_id = %record.id, role = %role, "authenticated");
        Ok(Identity {
            id: record.id,
            role,
            active: record.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::identity::UserRecord;
    use crate::storage::MemoryDirectory;

    fn validator() -> TokenValidator {
        TokenValidator::new(TokenConfig {
            secret: "test-secret".into(),
            ..TokenConfig::default()
        })
    }

    async fn authenticator_with(users: Vec<UserRecord>) -> (Authenticator, MemoryAuditSink) {
        let directory = MemoryDirectory::new();
        for user in users {
            directory.upsert_user(user).await;
        }
        let sink = MemoryAuditSink::new();
        let auth = Authenticator::new(Arc::new(directory), validator(), Arc::new(sink.clone()));
        (auth, sink)
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let (auth, _) =
            authenticator_with(vec![UserRecord::new("u1", Role::Assistant, true)]).await;
        let token = validator().issue("u1").unwrap();

        let identity = auth
            .authenticate(Some(&Credential::bearer(token)))
            .await
            .unwrap();
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.role, Role::Assistant);
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let (auth, sink) = authenticator_with(vec![]).await;
        let err = auth.authenticate(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
        assert_eq!(sink.count_of(AuditEventType::AuthenticationFailure), 1);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired_even_for_unknown_users() {
        // Expiry is checked before the directory lookup, so the error must
        // be ExpiredCredential, not UnknownUser.
        let (auth, _) = authenticator_with(vec![]).await;
        let token = validator().issue_expired("ghost").unwrap();

        let err = auth
            .authenticate(Some(&Credential::bearer(token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ExpiredCredential));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid_not_expired() {
        let (auth, _) = authenticator_with(vec![]).await;
        let err = auth
            .authenticate(Some(&Credential::bearer("not.a.jwt")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let (auth, _) =
            authenticator_with(vec![UserRecord::new("u1", Role::Admin, true)]).await;
        let foreign = TokenValidator::new(TokenConfig {
            secret: "test-secret".into(),
            issuer: "someone-else".into(),
            ..TokenConfig::default()
        });
        let token = foreign.issue("u1").unwrap();

        let err = auth
            .authenticate(Some(&Credential::bearer(token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));
    }

    #[tokio::test]
    async fn unknown_user_then_inactive_then_invalid_role() {
        let (auth, _) = authenticator_with(vec![
            UserRecord::new("sleeper", Role::Assistant, false),
            UserRecord {
                id: "odd".into(),
                role: "manager".into(),
                active: true,
                created_at: Utc::now(),
            },
        ])
        .await;
        let v = validator();

        let err = auth
            .authenticate(Some(&Credential::bearer(v.issue("ghost").unwrap())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));

        let err = auth
            .authenticate(Some(&Credential::bearer(v.issue("sleeper").unwrap())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InactiveAccount));

        let err = auth
            .authenticate(Some(&Credential::bearer(v.issue("odd").unwrap())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRole { role } if role == "manager"));
    }
}
