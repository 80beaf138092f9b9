//! Identity tokens and federated cloud credentials.
//!
//! Both are secrets scoped to one command invocation. Their `Debug` output is
//! redacted so they can ride through `tracing` fields and error contexts.

use std::fmt;

use chrono::{DateTime, Utc};

/// Keycloak coordinates for the PKCE login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceConfig {
    pub keycloak_url: String,
    pub realm: String,
    pub client_id: String,
}

impl PkceConfig {
    /// OIDC issuer: `{keycloak_url}/realms/{realm}`.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "{}/realms/{}",
            self.keycloak_url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// Opaque bearer token proving the operator's identity. Never parsed here.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(<redacted>)")
    }
}

/// Short-lived role credentials from identity federation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
