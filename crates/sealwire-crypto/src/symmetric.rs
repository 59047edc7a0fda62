//! Symmetric encryption using AES-256-CBC
//!
//! Every encryption draws a fresh 16-byte IV from the OS random source and
//! emits `IV ‖ ciphertext`. CBC gives confidentiality only; integrity comes
//! from the signature layer in [`crate::envelope`] and is absent when this
//! module is used on its own.

use crate::{CryptoError, Result, keys::SymmetricKey};
use aes::Aes256;
use base64::Engine;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::rngs::OsRng;

/// Size of the initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

pub(crate) type Aes256CbcEnc = cbc::Encryptor<Aes256>;
pub(crate) type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// An initialization vector for CBC mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv {
    bytes: [u8; IV_SIZE],
}

impl Iv {
    /// Generate a random IV
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != IV_SIZE {
            return Err(CryptoError::InvalidCiphertext(format!(
                "IV must be {} bytes, got {}",
                IV_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; IV_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the IV bytes
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }
}

pub(crate) fn encryptor(key: &SymmetricKey, iv: &Iv) -> Result<Aes256CbcEnc> {
    Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

pub(crate) fn decryptor(key: &SymmetricKey, iv: &Iv) -> Result<Aes256CbcDec> {
    Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// AES-256-CBC over whole buffers
#[derive(Clone, Debug)]
pub struct Cipher {
    key: SymmetricKey,
}

impl Cipher {
    /// Create a cipher bound to the given key
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Encrypt under a fresh random IV, returning `IV ‖ ciphertext`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_iv(&Iv::generate(), plaintext)
    }

    /// Encrypt under a caller-chosen IV.
    ///
    /// Reusing an IV under the same key leaks plaintext equality; this exists for
    /// known-answer tests and interop fixtures.
    pub fn encrypt_with_iv(&self, iv: &Iv, plaintext: &[u8]) -> Result<Vec<u8>> {
        let ciphertext = encryptor(&self.key, iv)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        let mut blob = Vec::with_capacity(IV_SIZE + ciphertext.len());
        blob.extend_from_slice(iv.as_bytes());
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypt an `IV ‖ ciphertext` blob
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < IV_SIZE + BLOCK_SIZE {
            return Err(CryptoError::InvalidCiphertext(format!(
                "blob of {} bytes is shorter than IV plus one block",
                blob.len()
            )));
        }
        let (iv, ciphertext) = blob.split_at(IV_SIZE);
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::InvalidCiphertext(format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            )));
        }
        decryptor(&self.key, &Iv::from_bytes(iv)?)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::Decryption("bad padding or wrong key".to_string()))
    }

    /// Encrypt and render `IV ‖ ciphertext` as base64 text
    pub fn encrypt_to_text(&self, plaintext: &[u8]) -> Result<String> {
        let blob = self.encrypt(plaintext)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    /// Decode base64 text produced by [`Cipher::encrypt_to_text`] and decrypt it
    pub fn decrypt_text(&self, text: &[u8]) -> Result<Vec<u8>> {
        let blob = base64::engine::general_purpose::STANDARD.decode(text)?;
        self.decrypt(&blob)
    }

    /// Get the key
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }
}

/// Encrypt data under a fresh IV (convenience function)
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    Cipher::new(key.clone()).encrypt(plaintext)
}

/// Decrypt an `IV ‖ ciphertext` blob (convenience function)
pub fn decrypt(key: &SymmetricKey, blob: &[u8]) -> Result<Vec<u8>> {
    Cipher::new(key.clone()).decrypt(blob)
}
