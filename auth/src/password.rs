//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters, so verification needs nothing but the stored string.
//! Both operations are CPU-bound; async callers go through
//! [`hash_blocking`] / [`verify_blocking`], which run on tokio's blocking pool.

use crate::error::{AuthError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Reject passwords that are too short.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] when `plaintext` has fewer than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(plaintext: &str) -> Result<()> {
    if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput {
            field: "password",
            reason: "must be at least 8 characters",
        });
    }
    Ok(())
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] if Argon2 fails.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored PHC hash.
///
/// A malformed stored hash verifies as `false`; it never matches anything.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] on failure, [`AuthError::InternalError`] if
/// the blocking task panicked.
pub async fn hash_blocking(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(|_| AuthError::InternalError)?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns [`AuthError::InternalError`] if the blocking task panicked.
pub async fn verify_blocking(plaintext: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &stored_hash))
        .await
        .map_err(|_| AuthError::InternalError)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plaintext_is_never_a_valid_hash() {
        // Legacy rows stored plaintext; they must not authenticate
        assert!(!verify_password("hunter22", "hunter22"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_password_length_policy() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        // Counted in characters, not bytes
        assert!(validate_password("ñññññññ").is_err());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_blocking("s3cret-pass".to_string()).await.unwrap();
        assert!(verify_blocking("s3cret-pass".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_blocking("other".to_string(), hash).await.unwrap());
    }
}
