//! Configuration system for Realmgate
//!
//! Loads configuration from TOML files: server bind address, target
//! realm, token-key material, and logging.

mod types;

pub use types::*;

use crate::auth::JwtDecoder;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main Realmgate configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Realm configuration
    pub realm: RealmConfig,
    /// Token verification configuration
    pub auth: AuthConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Convert from raw TOML config to validated config
    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let server = raw.server.unwrap_or_default().into();
        let realm = raw.realm.unwrap_or_default().into();
        let auth = raw
            .auth
            .ok_or_else(|| ConfigError::Invalid("missing [auth] section".to_string()))?
            .try_into()?;
        let logging = raw.logging.unwrap_or_default().into();

        Ok(Self {
            server,
            realm,
            auth,
            logging,
        })
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("realmgate")
            .join("config.toml")
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8089".to_string(),
        }
    }
}

/// Realm configuration
#[derive(Debug, Clone)]
pub struct RealmConfig {
    /// Name of the realm this instance provisions into
    pub name: String,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            name: "master".to_string(),
        }
    }
}

/// Token-key material for bearer verification
#[derive(Debug, Clone)]
pub enum TokenKey {
    /// HS256 shared secret
    Hs256Secret(SecretString),
    /// Path to an RS256 public key in PEM format
    Rs256PublicKey(PathBuf),
}

/// Token verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key material for verifying inbound tokens
    pub key: TokenKey,
}

impl AuthConfig {
    /// Build the token decoder described by this configuration
    pub async fn build_decoder(&self) -> Result<JwtDecoder, ConfigError> {
        match &self.key {
            TokenKey::Hs256Secret(secret) => {
                Ok(JwtDecoder::hs256(secret.expose_secret().as_bytes()))
            }
            TokenKey::Rs256PublicKey(path) => {
                let pem = fs::read(path).await?;
                JwtDecoder::rs256_pem(&pem).map_err(|e| ConfigError::Invalid(e.to_string()))
            }
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Format: "json" or "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}
