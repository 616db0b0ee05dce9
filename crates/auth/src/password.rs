//! Password hashing and validation.

use bcrypt::{hash, verify};
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes (bcrypt ignores anything past 72).
pub const MAX_PASSWORD_LENGTH: usize = 72;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("{0}")]
    Weak(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash a password with bcrypt.
///
/// bcrypt is CPU-bound, so the work runs on the blocking thread pool instead
/// of stalling the async runtime.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("task join error: {e}")))?
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the hash itself is
/// unusable.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &password_hash).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("task join error: {e}")))?
}

/// Check that a password is usable before hashing it.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Weak("Password is required.".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::Weak(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::Weak(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} bytes."
        )));
    }

    Ok(())
}
