//! Authentication gate for privileged operations
//!
//! Provides functions for:
//! - Extracting bearer tokens from request context
//! - Resolving the caller's identity from a token
//! - Enforcing realm-level and resource-scoped role checks

use super::decoder::TokenDecoder;
use super::types::AccessToken;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Authorization errors
///
/// The Forbidden message is fixed and does not disclose which role was
/// missing.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Bearer token required")]
    Unauthenticated,

    #[error("insufficient credentials")]
    Forbidden,
}

/// Per-request context supplied by the enclosing runtime
///
/// Carries the current realm and the raw Authorization header value, the
/// only two things the gate needs from the request.
#[derive(Debug, Clone)]
pub struct RequestSession {
    realm: String,
    bearer: Option<String>,
}

impl RequestSession {
    /// Create a session for a realm with no credential
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            bearer: None,
        }
    }

    /// Attach a raw bearer token
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Create a session from an Authorization header value
    ///
    /// A missing header, a non-Bearer scheme, or an empty token all yield
    /// an anonymous session.
    pub fn from_authorization(realm: impl Into<String>, header: Option<&str>) -> Self {
        let session = Self::new(realm);
        match header.and_then(extract_bearer) {
            Some(token) => session.with_bearer(token),
            None => session,
        }
    }

    /// The realm this request targets
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// The raw bearer token, if one was presented
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

/// Extract the token from an Authorization header value
///
/// Expected format: `Bearer <token>`, scheme case-insensitive.
fn extract_bearer(header: &str) -> Option<String> {
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

/// Result of successful authentication
#[derive(Debug, Clone)]
pub struct AuthResult {
    token: AccessToken,
}

impl AuthResult {
    /// The authenticated caller's username
    pub fn username(&self) -> &str {
        self.token.username()
    }

    /// The decoded credential
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Require a realm-level role, failing closed when the credential
    /// carries no realm-access section at all
    pub fn require_realm_role(&self, role: &str) -> Result<(), AuthError> {
        if self.token.has_realm_role(role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// Require a role scoped to an administrative resource
    ///
    /// A realm-level role of the same name does not satisfy this check.
    pub fn require_resource_role(&self, resource: &str, role: &str) -> Result<(), AuthError> {
        if self.token.has_resource_role(resource, role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Gate every privileged operation behind proof of a valid bearer
/// credential and proof of a specific granted role
pub struct AuthGate {
    decoder: Arc<dyn TokenDecoder>,
}

impl AuthGate {
    /// Create a gate over a token decoder
    pub fn new(decoder: Arc<dyn TokenDecoder>) -> Self {
        Self { decoder }
    }

    /// Resolve the caller behind a session, logging an audit line
    ///
    /// Returns `None` for anonymous callers - no token, or a token the
    /// decoder rejects. Never fails for the anonymous case.
    pub fn resolve_caller(&self, session: &RequestSession) -> Option<AuthResult> {
        let token = match session.bearer() {
            Some(raw) => match self.decoder.decode(raw) {
                Ok(token) => token,
                Err(e) => {
                    debug!(realm = %session.realm(), error = %e, "rejected bearer token");
                    info!(realm = %session.realm(), "anonymous caller entering realm");
                    return None;
                }
            },
            None => {
                info!(realm = %session.realm(), "anonymous caller entering realm");
                return None;
            }
        };

        info!(
            user = %token.username(),
            realm = %session.realm(),
            client = token.azp.as_deref().unwrap_or("-"),
            roles = ?token.realm_role_names(),
            "authenticated caller entering realm"
        );

        Some(AuthResult { token })
    }

    /// Resolve the caller and fail when no valid credential was presented
    pub fn require_authenticated(&self, session: &RequestSession) -> Result<AuthResult, AuthError> {
        self.resolve_caller(session).ok_or(AuthError::Unauthenticated)
    }
}
