//! Realmgate - token-gated user provisioning for identity realms
//!
//! Realmgate extends an identity-provider runtime with a single
//! administrative capability: creating a user account through a
//! bearer-token-authenticated HTTP call, guarded by a resource-scoped
//! role check. The token parser and the user directory are trait-based
//! collaborators; an in-memory directory ships with the crate so the
//! server is runnable and testable on its own.

pub mod auth;
pub mod config;
pub mod directory;
pub mod provision;
pub mod web;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Core error types for Realmgate
#[derive(Error, Debug)]
pub enum RealmgateError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A serializable secret string wrapper
///
/// Used for password material that must not leak through Debug output.
#[derive(Debug, Clone)]
pub struct Secret(SecretString);

impl Secret {
    /// Create a new secret from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.expose_secret().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}
