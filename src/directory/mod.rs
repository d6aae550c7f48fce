//! User-directory collaborator contract
//!
//! The directory owns all account state. Realmgate only queries it and
//! issues create/enable/credential mutations through this trait; an
//! in-memory implementation ships with the crate.

mod memory;

pub use memory::MemoryDirectory;

use crate::Secret;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Directory-related errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// The kind of credential attached to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Plain password credential
    Password,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::Password => write!(f, "password"),
        }
    }
}

/// A credential record attached to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    /// Kind tag
    pub kind: CredentialKind,
    /// The credential material
    pub value: Secret,
}

impl UserCredential {
    /// Create a password credential
    pub fn password(value: Secret) -> Self {
        Self {
            kind: CredentialKind::Password,
            value,
        }
    }
}

/// An account record owned by the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Realm the account belongs to
    pub realm: String,
    /// Account username, unique within the realm
    pub username: String,
    /// Whether the account may log in
    pub enabled: bool,
    /// Attached credential records
    #[serde(default)]
    pub credentials: Vec<UserCredential>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new, disabled account record with a generated ID
    pub fn new(realm: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            realm: realm.into(),
            username: username.into(),
            enabled: false,
            credentials: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The account's password credential, if one is set
    pub fn password_credential(&self) -> Option<&UserCredential> {
        self.credentials
            .iter()
            .find(|c| c.kind == CredentialKind::Password)
    }
}

/// Trait for user-directory backends
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find accounts matching a username within a realm
    async fn find_users_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Vec<User>, DirectoryError>;

    /// Create a new account
    ///
    /// The directory enforces per-realm username uniqueness and is the
    /// final authority when concurrent creates race.
    async fn create_user(&self, realm: &str, username: &str) -> Result<User, DirectoryError>;

    /// Enable or disable an account
    async fn set_enabled(
        &self,
        realm: &str,
        user_id: &str,
        enabled: bool,
    ) -> Result<(), DirectoryError>;

    /// Set an account's password credential, replacing any existing one
    async fn set_password_credential(
        &self,
        realm: &str,
        user_id: &str,
        password: Secret,
    ) -> Result<(), DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_starts_disabled() {
        let user = User::new("master", "alice");
        assert_eq!(user.realm, "master");
        assert_eq!(user.username, "alice");
        assert!(!user.enabled);
        assert!(user.credentials.is_empty());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_password_credential_lookup() {
        let mut user = User::new("master", "alice");
        assert!(user.password_credential().is_none());

        user.credentials.push(UserCredential::password(Secret::new("s3cret")));
        let cred = user.password_credential().unwrap();
        assert_eq!(cred.kind, CredentialKind::Password);
        assert_eq!(cred.value.expose(), "s3cret");
    }

    #[test]
    fn test_credential_kind_serialization() {
        let json = serde_json::to_string(&CredentialKind::Password).unwrap();
        assert_eq!(json, "\"password\"");
        assert_eq!(CredentialKind::Password.to_string(), "password");
    }
}
