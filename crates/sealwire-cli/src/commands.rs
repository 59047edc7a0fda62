//! Subcommand bodies
//!
//! Each function is a thin call into `sealwire_crypto` and returns what the
//! binary prints.

use crate::config::to_env_lines;
use crate::error::{CliError, Result};
use sealwire_crypto::{
    EnvelopeCodec, FileCipher, KeySet, PasswordHasher, SymmetricKey, tokens,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fresh key material as `.env` lines
pub fn keygen(bits: usize) -> Result<String> {
    let keys = KeySet::generate_with_bits(bits)?;
    info!(bits, "Generated key set");
    to_env_lines(&keys)
}

/// Encrypt `path` in place, returning the `.encrypted` path
pub async fn encrypt_file(key: SymmetricKey, path: &Path) -> Result<PathBuf> {
    let out = FileCipher::new(key).encrypt_file(path).await?;
    info!(path = %out.display(), "Encrypted file");
    Ok(out)
}

/// Decrypt `path.encrypted` back to `path`
pub async fn decrypt_file(key: SymmetricKey, path: &Path) -> Result<PathBuf> {
    let out = FileCipher::new(key).decrypt_file(path).await?;
    info!(path = %out.display(), "Decrypted file");
    Ok(out)
}

/// Seal a JSON document into an envelope
pub fn seal(codec: &EnvelopeCodec, json: &str) -> Result<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(codec.serialize(&value)?)
}

/// Open an envelope and render its value as pretty JSON
pub fn open(codec: &EnvelopeCodec, envelope: &[u8]) -> Result<String> {
    let value: serde_json::Value = codec.deserialize(envelope).ok_or(CliError::EnvelopeRejected)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub async fn hash_password(hasher: &PasswordHasher, password: &str) -> Result<String> {
    Ok(hasher.hash(password).await?)
}

pub async fn verify_password(hasher: &PasswordHasher, password: &str, hash: &str) -> Result<bool> {
    Ok(hasher.verify(password, hash).await?)
}

pub fn key_code() -> String {
    tokens::generate_key_code()
}

pub fn backup_code() -> String {
    tokens::generate_backup_code()
}

pub async fn token(hasher: &PasswordHasher, context: &str) -> Result<String> {
    Ok(tokens::generate_token(context, hasher).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealwire_crypto::password::MIN_COST;
    use sealwire_crypto::KeyPair;
    use std::sync::OnceLock;

    fn keypair() -> &'static KeyPair {
        static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();
        KEYPAIR.get_or_init(|| KeyPair::generate(1024).unwrap())
    }

    #[test]
    fn test_seal_and_open_json() {
        let key = SymmetricKey::generate();
        let sender = EnvelopeCodec::new(key.clone(), keypair());
        let receiver = EnvelopeCodec::receive_only(key, keypair().public_key().clone());

        let envelope = seal(&sender, r#"{"user":"alice","roles":["admin"],"n":3}"#).unwrap();
        let opened: serde_json::Value = serde_json::from_str(&open(&receiver, &envelope).unwrap()).unwrap();
        assert_eq!(opened["user"], "alice");
        assert_eq!(opened["roles"][0], "admin");
        assert_eq!(opened["n"], 3);
    }

    #[test]
    fn test_open_rejects_foreign_envelope() {
        let sender = EnvelopeCodec::new(SymmetricKey::generate(), keypair());
        let receiver = EnvelopeCodec::receive_only(SymmetricKey::generate(), keypair().public_key().clone());
        let envelope = seal(&sender, "[1,2,3]").unwrap();
        assert!(matches!(open(&receiver, &envelope), Err(CliError::EnvelopeRejected)));
    }

    #[test]
    fn test_seal_rejects_bad_json() {
        let codec = EnvelopeCodec::new(SymmetricKey::generate(), keypair());
        assert!(matches!(seal(&codec, "{not json"), Err(CliError::Json(_))));
    }

    #[test]
    fn test_keygen_prints_three_vars() {
        let out = keygen(1024).unwrap();
        let names: Vec<&str> = out.lines().filter_map(|l| l.split_once('=')).map(|(k, _)| k).collect();
        assert_eq!(names, ["SEALWIRE_KEY", "SEALWIRE_PUBLIC_KEY", "SEALWIRE_PRIVATE_KEY"]);
    }

    #[test]
    fn test_keygen_rejects_tiny_modulus() {
        assert!(keygen(512).is_err());
    }

    #[tokio::test]
    async fn test_file_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"remember the milk").await.unwrap();
        let key = SymmetricKey::generate();

        let encrypted = encrypt_file(key.clone(), &path).await.unwrap();
        assert!(encrypted.exists());
        decrypt_file(key, &path).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"remember the milk");
    }

    #[tokio::test]
    async fn test_password_commands() {
        let hasher = PasswordHasher::new(MIN_COST);
        let hash = hash_password(&hasher, "hunter2").await.unwrap();
        assert!(verify_password(&hasher, "hunter2", &hash).await.unwrap());
        assert!(!verify_password(&hasher, "hunter3", &hash).await.unwrap());
    }
}
