use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, phc::PasswordHash},
};

use crate::error::{AppError, AppResult};

/// Hash a password using Argon2id with a fresh random salt
///
/// # Returns
/// * `AppResult<String>` - The PHC-formatted hash string
pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to hash password: {}", e),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash
///
/// The comparison itself is constant-time inside `argon2`.
///
/// # Returns
/// * `AppResult<bool>` - True if password matches, false otherwise. A stored
///   value that is not a PHC string is an internal error.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Stored password hash is malformed: {}", e),
    })?;
    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
