//! argon2 hashing of user secrets.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not hash secret: {0}")]
pub struct SecretError(String);

/// Hash `secret` with a fresh random salt, returning the PHC string.
pub fn hash_secret(secret: &str) -> Result<String, SecretError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(secret.as_bytes(), &salt)
    .map_err(|e| SecretError(e.to_string()))?;
  Ok(hash.to_string())
}

/// Check `secret` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_secret(secret: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed)
    .is_ok()
}
