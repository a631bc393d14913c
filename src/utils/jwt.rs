use jiff::Timestamp;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Bearer token claims. The subject is the user id; nothing else about the
/// user is embedded, so every request re-reads the current record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `user_id` valid for `expiration_hours` from now.
    pub fn new(user_id: &str, expiration_hours: i64) -> Self {
        let iat = Timestamp::now().as_second();
        Self {
            sub: user_id.to_string(),
            iat,
            exp: iat.saturating_add(expiration_hours.saturating_mul(3600)),
        }
    }
}

/// Issues an HS256 token for a user
///
/// # Arguments
/// * `user_id` - The user's ID, stored as the `sub` claim
/// * `secret` - The secret key for signing the token
/// * `expiration_hours` - Token validity duration in hours
///
/// # Returns
/// The encoded JWT token string
pub fn issue_token(user_id: &str, secret: &str, expiration_hours: i64) -> AppResult<String> {
    let claims = Claims::new(user_id, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates signature, structure and expiry of a token
///
/// # Returns
/// The decoded claims if the token is valid, `Unauthorized` otherwise
pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("Invalid token signature")
        }
        _ => AppError::unauthorized("Invalid token"),
    })
}
