//! Bearer-token decoding
//!
//! The decoder is the seam to the external token issuer: it turns a raw
//! bearer string into validated [`AccessToken`] claims. Signature trust
//! and issuance belong to the issuer; this side only verifies and parses.

use super::types::AccessToken;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

/// Token decoding errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("invalid key material: {0}")]
    Key(String),
}

/// Decodes a raw bearer token into access-token claims
pub trait TokenDecoder: Send + Sync {
    /// Validate the token and return its claims
    fn decode(&self, raw: &str) -> Result<AccessToken, TokenError>;
}

/// JWT-backed token decoder
///
/// Supports an HS256 shared secret or an RS256 public key. Expiration is
/// always validated; audience validation is left to the issuer's trust
/// chain.
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtDecoder {
    /// Create a decoder for HS256 tokens signed with a shared secret
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Self::validation(Algorithm::HS256),
        }
    }

    /// Create a decoder for RS256 tokens from a PEM-encoded public key
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|e| TokenError::Key(e.to_string()))?;
        Ok(Self {
            key,
            validation: Self::validation(Algorithm::RS256),
        })
    }

    fn validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        validation
    }
}

impl TokenDecoder for JwtDecoder {
    fn decode(&self, raw: &str) -> Result<AccessToken, TokenError> {
        decode::<AccessToken>(raw, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}
