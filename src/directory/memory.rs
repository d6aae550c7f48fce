//! In-memory user directory
//!
//! Keeps accounts in a map keyed by user ID with a secondary
//! (realm, username) index. Uniqueness is enforced under the write lock,
//! so a check-then-create race between two requests resolves to exactly
//! one created account.

use super::{DirectoryError, User, UserCredential, UserDirectory};
use crate::Secret;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// State behind the directory lock
#[derive(Debug, Default)]
struct DirectoryState {
    /// Users by ID
    users: HashMap<String, User>,
    /// Index: (realm, username) -> user ID
    name_index: HashMap<(String, String), String>,
}

/// In-memory directory backend
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl MemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts across all realms
    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_users_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> Result<Vec<User>, DirectoryError> {
        let state = self.state.read();
        let key = (realm.to_string(), username.to_string());

        Ok(state
            .name_index
            .get(&key)
            .and_then(|id| state.users.get(id))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn create_user(&self, realm: &str, username: &str) -> Result<User, DirectoryError> {
        let mut state = self.state.write();
        let key = (realm.to_string(), username.to_string());

        if state.name_index.contains_key(&key) {
            return Err(DirectoryError::AlreadyExists(username.to_string()));
        }

        let user = User::new(realm, username);
        state.name_index.insert(key, user.id.clone());
        state.users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn set_enabled(
        &self,
        realm: &str,
        user_id: &str,
        enabled: bool,
    ) -> Result<(), DirectoryError> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(user_id)
            .filter(|u| u.realm == realm)
            .ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))?;

        user.enabled = enabled;
        Ok(())
    }

    async fn set_password_credential(
        &self,
        realm: &str,
        user_id: &str,
        password: Secret,
    ) -> Result<(), DirectoryError> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(user_id)
            .filter(|u| u.realm == realm)
            .ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))?;

        user.credentials.retain(|c| c.kind != super::CredentialKind::Password);
        user.credentials.push(UserCredential::password(password));
        Ok(())
    }
}
