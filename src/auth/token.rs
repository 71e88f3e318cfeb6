// Signed access tokens (HS256 JWT)

use crate::core::error::ApiError;
use crate::utils::time::current_timestamp;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Missing bearer token")]
    Missing,

    #[error("Invalid token format (expected 'Bearer <token>')")]
    InvalidFormat,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            _ => ApiError::Unauthenticated,
        }
    }
}

/// Token claims. Only identity and the time window are embedded; the
/// caller's role is re-derived from the user store on every request so a
/// role change takes effect on already-issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// Issued at, Unix seconds.
    pub iat: u64,
    /// Expiry, Unix seconds. Sliding: re-issued on every valid use.
    pub exp: u64,
}

/// Issues and verifies sliding-expiry access tokens.
pub struct TokenSigner {
    secret: String,
    lifetime_secs: i64,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 60; // clock skew

        Self {
            secret,
            lifetime_secs,
            validation,
        }
    }

    /// Mint a token for `username` expiring `lifetime_secs` from now.
    /// Called at login and again on every authenticated request, which is
    /// what makes the expiry sliding.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = current_timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now as u64,
            exp: (now + self.lifetime_secs) as u64,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Invalid("empty subject".to_string()));
        }
        Ok(data.claims)
    }

    /// Pull the raw token out of an `Authorization` header value.
    pub fn extract_bearer(auth_header: &str) -> Result<&str, TokenError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(TokenError::InvalidFormat)?;
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        Ok(token)
    }
}
