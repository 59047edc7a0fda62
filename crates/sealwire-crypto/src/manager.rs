//! One object owning a [`KeySet`] and exposing every operation with that
//! key material as the default.
//!
//! The `*_with` variants take an explicit key instead.

use crate::{
    Result,
    config::CryptoConfig,
    envelope::EnvelopeCodec,
    file::FileCipher,
    keys::{KeyPair, KeySet, PrivateKey, PublicKey, SymmetricKey},
    password::{self, PasswordHasher},
    signature::{self, RsaPadding, SignatureEngine},
    symmetric::{self, Cipher},
    tokens,
};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

/// Key holder and entry point for the sealwire primitives
#[derive(Clone, Debug)]
pub struct CryptoManager {
    keys: KeySet,
    config: CryptoConfig,
    cipher: Cipher,
    signatures: SignatureEngine,
    envelope: EnvelopeCodec,
    hasher: PasswordHasher,
}

impl CryptoManager {
    /// Create a manager with default configuration
    pub fn new(keys: KeySet) -> Self {
        Self::with_config(keys, CryptoConfig::default())
    }

    /// Create a manager with explicit configuration
    pub fn with_config(keys: KeySet, config: CryptoConfig) -> Self {
        let cipher = Cipher::new(keys.key.clone());
        let signatures = SignatureEngine::new(
            keys.keypair.private_key().clone(),
            keys.keypair.public_key().clone(),
        );
        let envelope =
            EnvelopeCodec::with_engines(cipher.clone(), signatures.clone()).with_config(&config);
        let hasher = PasswordHasher::new(config.password_cost);
        Self {
            keys,
            config,
            cipher,
            signatures,
            envelope,
            hasher,
        }
    }

    /// Generate a symmetric key and a 2048-bit RSA pair
    pub fn generate_key_set() -> Result<KeySet> {
        KeySet::generate()
    }

    /// `size` random bytes suitable as key material
    pub fn generate_symmetric_key(size: usize) -> Vec<u8> {
        crate::keys::generate_key_bytes(size)
    }

    /// Generate an RSA key pair
    pub fn generate_key_pair(bits: usize) -> Result<KeyPair> {
        KeyPair::generate(bits)
    }

    /// SHA-256 of a passphrase as a symmetric key; see [`SymmetricKey::from_password`]
    pub fn key_from_password(password: &str) -> SymmetricKey {
        SymmetricKey::from_password(password)
    }

    /// The key material this manager was built with
    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// The active configuration
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// The envelope codec bound to this manager's keys
    pub fn envelope(&self) -> &EnvelopeCodec {
        &self.envelope
    }

    // Symmetric buffers

    /// AES-256-CBC under the default key; returns `IV ‖ ciphertext`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher.encrypt(plaintext)
    }

    /// Reverse of [`CryptoManager::encrypt`]
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        self.cipher.decrypt(blob)
    }

    /// Encrypt under an explicit key
    pub fn encrypt_with(&self, key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        symmetric::encrypt(key, plaintext)
    }

    /// Decrypt under an explicit key
    pub fn decrypt_with(&self, key: &SymmetricKey, blob: &[u8]) -> Result<Vec<u8>> {
        symmetric::decrypt(key, blob)
    }

    // Files

    /// Encrypt `path` into `path.encrypted` and remove `path`
    pub async fn encrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        self.encrypt_file_with(path, &self.keys.key).await
    }

    /// Decrypt `path.encrypted` into `path` and remove `path.encrypted`
    pub async fn decrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        self.decrypt_file_with(path, &self.keys.key).await
    }

    /// [`CryptoManager::encrypt_file`] under an explicit key
    pub async fn encrypt_file_with(&self, path: impl AsRef<Path>, key: &SymmetricKey) -> Result<PathBuf> {
        FileCipher::with_chunk_size(key.clone(), self.config.chunk_size)
            .encrypt_file(path)
            .await
    }

    /// [`CryptoManager::decrypt_file`] under an explicit key
    pub async fn decrypt_file_with(&self, path: impl AsRef<Path>, key: &SymmetricKey) -> Result<PathBuf> {
        FileCipher::with_chunk_size(key.clone(), self.config.chunk_size)
            .decrypt_file(path)
            .await
    }

    // Signatures and RSA encryption

    /// RSA-SHA256 signature with our private key
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.signatures.sign(data)
    }

    /// Check a signature against our public key
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        self.signatures.verify(data, signature)
    }

    /// Sign with an explicit private key
    pub fn sign_with(&self, data: &[u8], private_key: &PrivateKey) -> Result<Vec<u8>> {
        signature::sign(data, private_key)
    }

    /// Check a signature against an explicit public key
    pub fn verify_with(&self, data: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
        signature::verify(data, signature, public_key)
    }

    /// RSA-encrypt a short payload for our public key
    pub fn encrypt_small(&self, data: &[u8], padding: RsaPadding) -> Result<Vec<u8>> {
        self.signatures.encrypt_small(data, padding)
    }

    /// RSA-decrypt with our private key
    pub fn decrypt_small(&self, blob: &[u8], padding: RsaPadding) -> Result<Vec<u8>> {
        self.signatures.decrypt_small(blob, padding)
    }

    /// RSA-encrypt for an explicit public key
    pub fn encrypt_small_with(&self, data: &[u8], public_key: &PublicKey, padding: RsaPadding) -> Result<Vec<u8>> {
        signature::encrypt_small(data, public_key, padding)
    }

    /// RSA-decrypt with an explicit private key
    pub fn decrypt_small_with(&self, blob: &[u8], private_key: &PrivateKey, padding: RsaPadding) -> Result<Vec<u8>> {
        signature::decrypt_small(blob, private_key, padding)
    }

    // Passwords

    /// bcrypt at the configured cost
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher.hash(password).await
    }

    /// bcrypt at an explicit cost
    pub async fn hash_password_with_cost(&self, password: &str, cost: u32) -> Result<String> {
        password::hash_with_cost(password, cost).await
    }

    /// Check a password against a bcrypt hash
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        self.hasher.verify(password, hash).await
    }

    // Envelopes

    /// Seal a value for the wire
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.envelope.serialize(value)
    }

    /// Open an envelope; `None` if it is not authentic or not decodable
    pub fn deserialize<T: DeserializeOwned>(&self, envelope: &[u8]) -> Option<T> {
        self.envelope.deserialize(envelope)
    }

    // Codes and tokens

    /// `length` characters drawn uniformly from `alphabet`
    pub fn random_string(&self, length: usize, alphabet: &str) -> Result<String> {
        tokens::random_string(length, alphabet)
    }

    /// Human-typable key code, five groups of five
    pub fn generate_key_code(&self) -> String {
        tokens::generate_key_code()
    }

    /// 10-character lower-case alphanumeric backup code
    pub fn generate_backup_code(&self) -> String {
        tokens::generate_backup_code()
    }

    /// High-entropy bearer token with `context` mixed into its hashes, at the configured cost
    pub async fn generate_token(&self, context: &str) -> Result<String> {
        tokens::generate_token(context, &self.hasher).await
    }
}
