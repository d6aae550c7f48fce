//! JSON API handlers for the provisioning endpoint
//!
//! Maps provisioning outcomes and authorization failures onto HTTP
//! status codes; every response body is a `{"message": ...}` envelope.

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, RequestSession};
use crate::provision::{ProvisionError, ProvisionOutcome, ProvisionRequest};
use crate::Secret;

use super::server::AppState;

/// Response envelope for every API outcome
#[derive(Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiMessage::new(message))).into_response()
}

/// Form body for the create-user endpoint
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    /// Username for the new account
    pub username: String,
    /// Initial password
    pub password: String,
}

/// Status code for a provisioning outcome
fn outcome_status(outcome: &ProvisionOutcome) -> StatusCode {
    StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Create a user account
///
/// `POST /create-user` with a form-encoded body and a bearer token.
/// Responds 200 on creation, 406 when the username is taken, 401 without
/// a valid token, 403 without the user-management resource role.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateUserForm>,
) -> Response {
    let session = RequestSession::from_authorization(
        state.realm.clone(),
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    );

    let request = ProvisionRequest {
        username: form.username,
        password: Secret::new(form.password),
    };

    match state.provisioner.create_user(&session, request).await {
        Ok(outcome) => message_response(outcome_status(&outcome), outcome.message()),
        Err(ProvisionError::Auth(err @ AuthError::Unauthenticated)) => {
            message_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
        Err(ProvisionError::Auth(err @ AuthError::Forbidden)) => {
            message_response(StatusCode::FORBIDDEN, err.to_string())
        }
        Err(ProvisionError::Directory(err)) => {
            tracing::error!(error = %err, "user directory failure");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint (no auth required)
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_serialization() {
        let message = ApiMessage::new("User (alice) created!");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"message":"User (alice) created!"}"#);
    }

    #[test]
    fn test_outcome_status_mapping() {
        let created = ProvisionOutcome::Created {
            username: "alice".to_string(),
        };
        assert_eq!(outcome_status(&created), StatusCode::OK);

        let exists = ProvisionOutcome::AlreadyExists {
            username: "alice".to_string(),
        };
        assert_eq!(outcome_status(&exists), StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "1.0.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
    }

    #[test]
    fn test_create_user_form_deserialization() {
        let form: CreateUserForm =
            serde_urlencoded::from_str("username=alice&password=s3cret").unwrap();
        assert_eq!(form.username, "alice");
        assert_eq!(form.password, "s3cret");
    }
}
