//! HTTP surface for Realmgate
//!
//! A single privileged endpoint (`POST /create-user`) plus an
//! unauthenticated health probe, served by axum.

mod api;
mod server;

pub use api::{ApiMessage, CreateUserForm, HealthResponse};
pub use server::{AppState, WebConfig, WebServer};
