//! Authentication and authorization module for Realmgate
//!
//! Gates every privileged operation behind:
//! - Proof of a valid bearer credential (resolved caller identity)
//! - Proof of a specific granted role, realm-level or resource-scoped
//!
//! Both role checks fail closed: a credential with no access section for
//! the requested scope does not hold the role.

mod decoder;
mod gate;
mod types;

pub use decoder::{JwtDecoder, TokenDecoder, TokenError};
pub use gate::{AuthError, AuthGate, AuthResult, RequestSession};
pub use types::{
    AccessToken, RoleAccess, RESOURCE_REALM_MANAGEMENT, ROLE_MANAGE_USERS,
};
