//! Credential types accepted by the authenticator.

use serde::{Deserialize, Serialize};

/// A credential presented with a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Credential {
    /// Bearer token (signed JWT).
    Bearer { token: String },
}

impl Credential {
    /// Create a bearer credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Parse an HTTP `Authorization` header value. Returns `None` for
    /// anything that is not a non-empty bearer token; the authenticator
    /// treats that as a missing credential.
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        let rest = header.strip_prefix("Bearer ").or_else(|| header.strip_prefix("bearer "))?;
        let token = rest.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self::bearer(token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        let cred = Credential::from_authorization_header("Bearer abc.def.ghi").unwrap();
        assert!(matches!(cred, Credential::Bearer { token } if token == "abc.def.ghi"));
    }

    #[test]
    fn rejects_non_bearer_schemes_and_empty_tokens() {
        assert!(Credential::from_authorization_header("Basic dXNlcjpwYXNz").is_none());
        assert!(Credential::from_authorization_header("Bearer ").is_none());
        assert!(Credential::from_authorization_header("").is_none());
    }
}
