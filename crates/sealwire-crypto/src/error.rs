//! Error types for the sealwire-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
///
/// Every variant except [`CryptoError::Io`] is a cryptographic failure; `Io`
/// covers filesystem trouble during streaming file encryption. Signature
/// mismatches on the envelope path never surface here: `EnvelopeCodec::deserialize`
/// reports them as `None`.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (bad padding, wrong key, truncated input)
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Invalid ciphertext format
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Producing a signature failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Data too large for operation
    #[error("data too large: {size} bytes exceeds maximum {max} bytes")]
    DataTooLarge { size: u64, max: u64 },

    /// Caller supplied an argument the operation cannot work with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Adaptive password hashing failed
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Structural encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Compression or decompression failed
    #[error("compression error: {0}")]
    Compression(String),

    /// Background task was cancelled or panicked
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 decode error
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

impl CryptoError {
    /// Check if this error came from the filesystem rather than the cipher
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_data_too_large() {
        let err = CryptoError::DataTooLarge { size: 300, max: 190 };
        assert_eq!(
            err.to_string(),
            "data too large: 300 bytes exceeds maximum 190 bytes"
        );
    }

    #[test]
    fn test_io_classification() {
        let io = CryptoError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_io());
        assert!(!CryptoError::Decryption("bad padding".into()).is_io());
    }
}
