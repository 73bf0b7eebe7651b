//! Password hashing and verification utilities.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::types::{AccountError, AccountResult};

/// Prefix marking a stored hash that no password can match.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> AccountResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash.
///
/// Unusable markers never verify. A stored value that is neither a marker
/// nor a parseable PHC string is reported as an error.
pub fn verify_password(password: &str, hash: &str) -> AccountResult<bool> {
    if !is_usable_password(hash) {
        return Ok(false);
    }

    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AccountError::Hashing(e.to_string()))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Stored in place of a hash for accounts created without a password.
///
/// The random suffix keeps two such accounts from sharing a value.
pub fn make_unusable_password(length: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();

    format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}")
}

pub fn is_usable_password(hash: &str) -> bool {
    !hash.is_empty() && !hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}
