//! User provisioning
//!
//! Implements "create a user if one does not already exist with this
//! identifier", protected by the authorization gate. The existence check
//! before creation is best-effort: it is not atomic with respect to
//! concurrent requests for the same username, and the directory's own
//! uniqueness enforcement is the final authority.

use crate::auth::{AuthError, AuthGate, RequestSession, RESOURCE_REALM_MANAGEMENT, ROLE_MANAGE_USERS};
use crate::directory::{DirectoryError, UserDirectory};
use crate::Secret;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Provisioning errors
///
/// Authorization failures pass through untouched so the HTTP layer can
/// map them to 401/403. Directory failures surface as a generic server
/// error.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("user directory failure: {0}")]
    Directory(#[from] DirectoryError),
}

/// The desired username and initial password, supplied by the caller
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Username for the new account
    pub username: String,
    /// Initial password credential
    pub password: Secret,
}

/// Outcome of a provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new account was created and enabled
    Created {
        /// The provisioned username
        username: String,
    },
    /// An account with this username already existed; nothing was changed
    AlreadyExists {
        /// The requested username
        username: String,
    },
}

impl ProvisionOutcome {
    /// Human-readable outcome message
    pub fn message(&self) -> String {
        match self {
            ProvisionOutcome::Created { username } => format!("User ({}) created!", username),
            ProvisionOutcome::AlreadyExists { username } => {
                format!("User ({}) already exists!", username)
            }
        }
    }

    /// HTTP-style status code for this outcome
    pub fn status_code(&self) -> u16 {
        match self {
            ProvisionOutcome::Created { .. } => 200,
            ProvisionOutcome::AlreadyExists { .. } => 406,
        }
    }
}

/// Orchestrates the create-user use case behind the authorization gate
pub struct Provisioner {
    gate: AuthGate,
    directory: Arc<dyn UserDirectory>,
}

impl Provisioner {
    /// Create a provisioner from its collaborators
    pub fn new(gate: AuthGate, directory: Arc<dyn UserDirectory>) -> Self {
        Self { gate, directory }
    }

    /// Create a user unless one already exists with this username
    ///
    /// Both gates must pass before the directory is touched: a valid
    /// bearer credential, then the user-management role scoped to the
    /// realm-management resource. No mutation happens on any failure
    /// path before the create step.
    pub async fn create_user(
        &self,
        session: &RequestSession,
        request: ProvisionRequest,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let auth = self.gate.require_authenticated(session)?;
        auth.require_resource_role(RESOURCE_REALM_MANAGEMENT, ROLE_MANAGE_USERS)?;

        debug!(user = %auth.username(), username = %request.username, "createUser requested");

        let realm = session.realm();
        let existing = self
            .directory
            .find_users_by_username(realm, &request.username)
            .await?;
        if !existing.is_empty() {
            let outcome = ProvisionOutcome::AlreadyExists {
                username: request.username,
            };
            debug!("{}", outcome.message());
            return Ok(outcome);
        }

        // A concurrent create for the same username can still win between
        // the check above and this call; the directory's uniqueness error
        // is then reported as the normal already-exists outcome.
        let user = match self.directory.create_user(realm, &request.username).await {
            Ok(user) => user,
            Err(DirectoryError::AlreadyExists(_)) => {
                return Ok(ProvisionOutcome::AlreadyExists {
                    username: request.username,
                });
            }
            Err(e) => return Err(e.into()),
        };

        self.directory.set_enabled(realm, &user.id, true).await?;
        self.directory
            .set_password_credential(realm, &user.id, request.password)
            .await?;

        let outcome = ProvisionOutcome::Created {
            username: request.username,
        };
        debug!("{}", outcome.message());
        Ok(outcome)
    }
}
