/// Password hashing and verification using Argon2id
use crate::error::{AuthError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using the Argon2id algorithm
///
/// ## Security
///
/// - Algorithm: Argon2id with the crate's default (OWASP-recommended) cost
/// - Salt: random salt generated per call, so equal inputs hash differently
///
/// CPU-bound and deliberately slow: never call it while holding a lock
/// that serializes requests.
///
/// ## Returns
///
/// PHC-formatted hash string safe for database storage
///
/// ## Errors
///
/// `HashingFailed` if the hashing primitive rejects its parameters
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailed(e.to_string()))
}

/// Verify a password against its stored hash
///
/// Comparison timing is whatever Argon2's own verifier provides (constant
/// time over the digest). A stored hash that does not parse yields `false`.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        tracing::warn!("Stored password hash is not valid PHC format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
