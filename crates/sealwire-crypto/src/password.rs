//! Password hashing with bcrypt
//!
//! bcrypt is deliberately slow, so both operations run on the tokio
//! blocking pool and are awaited by the caller.

use crate::{Result, config::DEFAULT_PASSWORD_COST};
use zeroize::Zeroizing;

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_COST: u32 = 31;

/// Salted adaptive password hasher
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_COST)
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured cost factor
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt at the configured cost
    pub async fn hash(&self, password: &str) -> Result<String> {
        hash_with_cost(password, self.cost).await
    }

    /// Check `password` against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).await
    }
}

/// Hash `password` at an explicit cost
pub async fn hash_with_cost(password: &str, cost: u32) -> Result<String> {
    let password = Zeroizing::new(password.to_owned());
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost)).await??;
    Ok(hash)
}

/// Check `password` against a stored bcrypt hash.
///
/// Mismatches return `Ok(false)`; a hash that cannot be parsed is an error.
pub async fn verify(password: &str, hash: &str) -> Result<bool> {
    let password = Zeroizing::new(password.to_owned());
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), &hash)).await??;
    Ok(matches)
}
