//! Random codes and bearer tokens
//!
//! Everything here draws from the OS random source. Nothing is stored and
//! nothing can be decoded back into its inputs.

use crate::{CryptoError, Result, password::PasswordHasher};
use rand::{Rng, distributions::Slice, rngs::OsRng};
use uuid::Uuid;

/// Alphabet for key codes: upper case and digits without 0, O, 1, I, J, U or X
pub const KEY_CODE_ALPHABET: &str = "ABCDEFGHKLMNPQRSTVWYZ23456789";

/// Alphabet for backup codes
pub const BACKUP_CODE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz1234567890";

/// Number of groups in a key code
pub const KEY_CODE_GROUPS: usize = 5;

/// Characters per key code group
pub const KEY_CODE_GROUP_LEN: usize = 5;

/// Separator between key code groups
pub const KEY_CODE_SEPARATOR: char = '-';

/// Length of a backup code
pub const BACKUP_CODE_LEN: usize = 10;

/// Draw `length` characters uniformly from `alphabet`
pub fn random_string(length: usize, alphabet: &str) -> Result<String> {
    let chars: Vec<char> = alphabet.chars().collect();
    let dist = Slice::new(&chars)
        .map_err(|_| CryptoError::InvalidInput("alphabet must not be empty".to_string()))?;
    Ok(OsRng.sample_iter(dist).take(length).collect())
}

/// A human-typable code such as `K7WQD-MZ2PA-...`: five groups of five
pub fn generate_key_code() -> String {
    let chars: Vec<char> = KEY_CODE_ALPHABET.chars().collect();
    let mut code = String::with_capacity(KEY_CODE_GROUPS * (KEY_CODE_GROUP_LEN + 1));
    for group in 0..KEY_CODE_GROUPS {
        if group > 0 {
            code.push(KEY_CODE_SEPARATOR);
        }
        for _ in 0..KEY_CODE_GROUP_LEN {
            code.push(chars[OsRng.gen_range(0..chars.len())]);
        }
    }
    code
}

/// A 10-character lower-case alphanumeric backup code
pub fn generate_backup_code() -> String {
    let chars: Vec<char> = BACKUP_CODE_ALPHABET.chars().collect();
    (0..BACKUP_CODE_LEN)
        .map(|_| chars[OsRng.gen_range(0..chars.len())])
        .collect()
}

/// An opaque high-entropy bearer token.
///
/// Layout: `uuid-hex(bcrypt(uuid) ‖ bcrypt(context) ‖ bcrypt(uuid))-uuid`,
/// every uuid an independent v4. The three hashes run concurrently on the
/// blocking pool.
pub async fn generate_token(context: &str, hasher: &PasswordHasher) -> Result<String> {
    let (lead, trail) = (Uuid::new_v4().to_string(), Uuid::new_v4().to_string());
    let (first, middle, last) = tokio::try_join!(
        hasher.hash(&lead),
        hasher.hash(context),
        hasher.hash(&trail),
    )?;
    let digest = hex::encode(format!("{}{}{}", first, middle, last));
    Ok(format!("{}-{}-{}", Uuid::new_v4(), digest, Uuid::new_v4()))
}
