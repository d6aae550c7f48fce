//! Raw configuration types for TOML parsing

use super::*;
use serde::Deserialize;

/// Raw configuration as parsed from TOML
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub server: Option<RawServerConfig>,
    pub realm: Option<RawRealmConfig>,
    pub auth: Option<RawAuthConfig>,
    pub logging: Option<RawLoggingConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawServerConfig {
    pub bind: Option<String>,
}

impl From<RawServerConfig> for ServerConfig {
    fn from(raw: RawServerConfig) -> Self {
        Self {
            bind: raw.bind.unwrap_or_else(|| ServerConfig::default().bind),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawRealmConfig {
    pub name: Option<String>,
}

impl From<RawRealmConfig> for RealmConfig {
    fn from(raw: RawRealmConfig) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| RealmConfig::default().name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawAuthConfig {
    pub hs256_secret: Option<String>,
    pub rs256_public_key: Option<String>,
}

impl TryFrom<RawAuthConfig> for AuthConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAuthConfig) -> Result<Self, Self::Error> {
        let key = match (raw.hs256_secret, raw.rs256_public_key) {
            (Some(secret), None) => TokenKey::Hs256Secret(SecretString::from(secret)),
            (None, Some(path)) => TokenKey::Rs256PublicKey(PathBuf::from(path)),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "set either hs256_secret or rs256_public_key, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "one of hs256_secret or rs256_public_key is required".to_string(),
                ))
            }
        };

        Ok(Self { key })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl From<RawLoggingConfig> for LoggingConfig {
    fn from(raw: RawLoggingConfig) -> Self {
        Self {
            level: raw.level.unwrap_or_else(|| "info".to_string()),
            format: raw.format.unwrap_or(LogFormat::Pretty),
        }
    }
}
