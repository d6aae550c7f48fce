//! Integration tests for the provisioning flow
//!
//! Tests the full path: minted bearer token -> auth gate -> provisioner
//! -> in-memory directory, and the same flow through the HTTP router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use realmgate::auth::{
    AccessToken, AuthError, AuthGate, JwtDecoder, RequestSession, RoleAccess,
    RESOURCE_REALM_MANAGEMENT, ROLE_MANAGE_USERS,
};
use realmgate::directory::{MemoryDirectory, UserDirectory};
use realmgate::provision::{ProvisionError, ProvisionOutcome, ProvisionRequest, Provisioner};
use realmgate::web::{WebConfig, WebServer};
use realmgate::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

const SIGNING_SECRET: &[u8] = b"integration-test-secret";
const FAR_FUTURE: u64 = 4102444800;

/// Mint a token holding the user-management resource role
fn manager_token() -> String {
    mint(AccessToken {
        sub: "ops-1".to_string(),
        preferred_username: Some("carol".to_string()),
        azp: Some("admin-cli".to_string()),
        exp: FAR_FUTURE,
        realm_access: Some(RoleAccess::new(["admin"])),
        resource_access: HashMap::from([(
            RESOURCE_REALM_MANAGEMENT.to_string(),
            RoleAccess::new([ROLE_MANAGE_USERS]),
        )]),
    })
}

/// Mint a token with realm-level roles only, including a realm-level
/// "manage-users" that must NOT satisfy the resource-scoped check
fn realm_admin_token() -> String {
    mint(AccessToken {
        sub: "ops-2".to_string(),
        preferred_username: Some("mallory".to_string()),
        azp: Some("admin-cli".to_string()),
        exp: FAR_FUTURE,
        realm_access: Some(RoleAccess::new(["admin", ROLE_MANAGE_USERS])),
        resource_access: HashMap::new(),
    })
}

fn mint(claims: AccessToken) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .unwrap()
}

fn provisioner(directory: Arc<MemoryDirectory>) -> Provisioner {
    let gate = AuthGate::new(Arc::new(JwtDecoder::hs256(SIGNING_SECRET)));
    Provisioner::new(gate, directory)
}

fn request(username: &str, password: &str) -> ProvisionRequest {
    ProvisionRequest {
        username: username.to_string(),
        password: Secret::new(password),
    }
}

/// Requests lacking a bearer token are rejected without any mutation
#[tokio::test]
async fn test_missing_token_rejected_without_mutation() {
    let directory = Arc::new(MemoryDirectory::new());
    let provisioner = provisioner(directory.clone());

    let session = RequestSession::new("master");
    let result = provisioner.create_user(&session, request("alice", "s3cret")).await;

    assert!(matches!(
        result,
        Err(ProvisionError::Auth(AuthError::Unauthenticated))
    ));
    assert_eq!(directory.user_count(), 0);
}

/// Realm-level roles, even one named "manage-users", do not satisfy the
/// resource-scoped check
#[tokio::test]
async fn test_realm_roles_do_not_grant_user_management() {
    let directory = Arc::new(MemoryDirectory::new());
    let provisioner = provisioner(directory.clone());

    let session = RequestSession::new("master").with_bearer(realm_admin_token());
    let result = provisioner.create_user(&session, request("alice", "s3cret")).await;

    assert!(matches!(
        result,
        Err(ProvisionError::Auth(AuthError::Forbidden))
    ));
    assert_eq!(directory.user_count(), 0);
}

/// A privileged token creates exactly one enabled user with the supplied
/// password; repeating the call reports the existing account untouched
#[tokio::test]
async fn test_create_then_already_exists() {
    let directory = Arc::new(MemoryDirectory::new());
    let provisioner = provisioner(directory.clone());
    let session = RequestSession::new("master").with_bearer(manager_token());

    let first = provisioner
        .create_user(&session, request("alice", "s3cret"))
        .await
        .unwrap();
    assert_eq!(first.message(), "User (alice) created!");
    assert_eq!(first.status_code(), 200);

    let users = directory
        .find_users_by_username("master", "alice")
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].enabled);
    assert_eq!(
        users[0].password_credential().unwrap().value.expose(),
        "s3cret"
    );

    let second = provisioner
        .create_user(&session, request("alice", "s3cret"))
        .await
        .unwrap();
    assert_eq!(second.message(), "User (alice) already exists!");
    assert_eq!(second.status_code(), 406);
    assert!(matches!(second, ProvisionOutcome::AlreadyExists { .. }));

    assert_eq!(directory.user_count(), 1);
}

// ==================== HTTP surface ====================

fn app(directory: Arc<MemoryDirectory>) -> Router {
    let server = WebServer::new(WebConfig::default(), provisioner(directory), "master");
    server.router()
}

fn create_user_request(bearer: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/create-user")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_http_create_then_conflict() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = app(directory.clone());
    let token = manager_token();

    let response = app
        .clone()
        .oneshot(create_user_request(
            Some(&token),
            "username=alice&password=s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "User (alice) created!"})
    );

    let response = app
        .oneshot(create_user_request(
            Some(&token),
            "username=alice&password=s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "User (alice) already exists!"})
    );

    assert_eq!(directory.user_count(), 1);
}

#[tokio::test]
async fn test_http_missing_token_is_unauthorized() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = app(directory.clone());

    let response = app
        .oneshot(create_user_request(None, "username=alice&password=s3cret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "Bearer token required"})
    );
    assert_eq!(directory.user_count(), 0);
}

#[tokio::test]
async fn test_http_invalid_token_is_unauthorized() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = app(directory);

    let response = app
        .oneshot(create_user_request(
            Some("not-a-real-token"),
            "username=alice&password=s3cret",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_http_insufficient_role_is_forbidden() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = app(directory.clone());
    let token = realm_admin_token();

    let response = app
        .oneshot(create_user_request(
            Some(&token),
            "username=alice&password=s3cret",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "insufficient credentials"})
    );
    assert_eq!(directory.user_count(), 0);
}

#[tokio::test]
async fn test_http_health() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = app(directory);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
