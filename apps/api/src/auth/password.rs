//! Argon2id hashing for the configured account passwords.

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::AuthError;

/// PHC string for `password` under a fresh salt and the default Argon2id cost.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Checks `password` against a stored PHC string.
///
/// Cost parameters are read from the string, so hashes made with other
/// settings still verify. A mismatch is `InvalidCredentials`; a string that
/// cannot be used at all is `UnusableHash`.
pub fn check_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::UnusableHash(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| match e {
            password_hash::Error::Password => AuthError::InvalidCredentials,
            other => AuthError::UnusableHash(other.to_string()),
        })
}
