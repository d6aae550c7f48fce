//! Access-token claim types for bearer authentication
//!
//! Provides:
//! - AccessToken, the decoded bearer credential
//! - RoleAccess, a set of granted role names
//! - Well-known resource and role names for user management

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The administrative resource that scopes user-management privileges
pub const RESOURCE_REALM_MANAGEMENT: &str = "realm-management";

/// The role required on [`RESOURCE_REALM_MANAGEMENT`] to mutate accounts
pub const ROLE_MANAGE_USERS: &str = "manage-users";

/// A set of role names granted at some scope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleAccess {
    /// Granted role names
    #[serde(default)]
    pub roles: HashSet<String>,
}

impl RoleAccess {
    /// Create a role set from an iterator of names
    pub fn new(roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a role name is in this set
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// A decoded bearer credential
///
/// Field names follow the wire shape emitted by the external issuer, so
/// the struct deserializes directly from token claims. Consumed
/// read-only, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Subject identifier
    pub sub: String,
    /// Human-readable username, when the issuer includes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Client the token was issued for (authorized party)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Expiration, seconds since the epoch
    pub exp: u64,
    /// Realm-level role grants; absent when the issuer grants none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RoleAccess>,
    /// Per-resource role grants, keyed by resource name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub resource_access: HashMap<String, RoleAccess>,
}

impl AccessToken {
    /// The username to attribute actions to, falling back to the subject
    pub fn username(&self) -> &str {
        self.preferred_username.as_deref().unwrap_or(&self.sub)
    }

    /// Check a realm-level role grant
    ///
    /// A token with no realm-access section does not hold any realm role.
    pub fn has_realm_role(&self, role: &str) -> bool {
        self.realm_access
            .as_ref()
            .is_some_and(|access| access.has_role(role))
    }

    /// Check a resource-scoped role grant
    ///
    /// A token with no entry for the resource does not hold the role,
    /// regardless of realm-level grants of the same name.
    pub fn has_resource_role(&self, resource: &str, role: &str) -> bool {
        self.resource_access
            .get(resource)
            .is_some_and(|access| access.has_role(role))
    }

    /// Realm-level role names, for audit logging
    pub fn realm_role_names(&self) -> Vec<&str> {
        self.realm_access
            .as_ref()
            .map(|access| access.roles.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
