//! # Sealwire Crypto
//!
//! Cryptographic primitives for shipping application values between
//! services that share a symmetric key and trust each other's RSA keys.
//!
//! This crate provides:
//! - **Envelopes**: MessagePack, AES-256-CBC, RSA-SHA256 signature and gzip
//!   in one call; opening fails closed
//! - **File encryption**: streamed, atomic `path` <-> `path.encrypted`
//! - **RSA**: PKCS#1 v1.5 signatures and small-message encryption
//! - **Passwords**: bcrypt on the blocking pool
//! - **Codes and tokens**: key codes, backup codes and opaque bearer tokens
//!
//! ## Security Model
//!
//! - An envelope opens only if its bytes are exactly what the signer produced
//! - Every failure to open an envelope looks the same to the caller
//! - Symmetric keys are zeroized on drop
//!
//! ## Example
//!
//! ```rust,ignore
//! use sealwire_crypto::{CryptoManager, KeySet};
//!
//! let manager = CryptoManager::new(KeySet::generate()?);
//!
//! let envelope = manager.serialize(&("alice", 42u32))?;
//! let value: Option<(String, u32)> = manager.deserialize(&envelope);
//! ```

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod file;
pub mod keys;
pub mod manager;
pub mod password;
pub mod signature;
pub mod streaming;
pub mod symmetric;
pub mod tokens;

pub use config::CryptoConfig;
pub use envelope::{EnvelopeCodec, IntegrityFailure};
pub use error::{CryptoError, Result};
pub use file::FileCipher;
pub use keys::{KeyPair, KeySet, PrivateKey, PublicKey, SymmetricKey};
pub use manager::CryptoManager;
pub use password::PasswordHasher;
pub use signature::{RsaPadding, SignatureEngine};
pub use symmetric::{Cipher, Iv};

/// Default read size for streaming file encryption (64 KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
