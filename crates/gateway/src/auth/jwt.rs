//! Session token validation
//!
//! Validate-only: access tokens are minted and signed by the external auth
//! service; the gateway only checks them.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an auth-service access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID as string, will be parsed to UUID)
    pub sub: String,
    /// Email of the authenticated user
    pub email: Option<String>,
    /// Expiration
    pub exp: i64,
}

/// Validator for auth-service session tokens
#[derive(Clone)]
pub struct SessionJwt {
    decoding_key: DecodingKey,
}

impl SessionJwt {
    /// Create a new validator from the shared signing secret
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate and decode an access token
    /// Explicit algorithm prevents algorithm confusion attacks
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionJwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionJwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => SessionJwtError::Invalid,
                _ => SessionJwtError::Validation(e.to_string()),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionJwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token validation failed: {0}")]
    Validation(String),
}
