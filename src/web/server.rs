//! Web server implementation using Axum

use crate::provision::Provisioner;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::api;

/// Web server configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind the server
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8089".to_string(),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The provisioning handler
    pub provisioner: Arc<Provisioner>,
    /// Realm this instance provisions into
    pub realm: String,
}

/// HTTP server for the provisioning API
pub struct WebServer {
    config: WebConfig,
    app_state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebConfig, provisioner: Provisioner, realm: impl Into<String>) -> Self {
        let app_state = AppState {
            provisioner: Arc::new(provisioner),
            realm: realm.into(),
        };

        Self { config, app_state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/create-user", post(api::create_user))
            .route("/health", get(api::health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the web server until the task is cancelled
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&self.config.bind).await?;

        tracing::info!(bind = %self.config.bind, realm = %self.app_state.realm, "Starting Realmgate server");

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Get the bind address
    pub fn bind_address(&self) -> &str {
        &self.config.bind
    }
}
