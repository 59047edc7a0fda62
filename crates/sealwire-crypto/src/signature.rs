//! RSA signatures and small-message encryption
//!
//! Signatures are PKCS#1 v1.5 over a SHA-256 digest (RSA-SHA256). Their
//! length always equals the modulus size of the signing key.
//!
//! Private-key decryption in `rsa` is not constant-time (RUSTSEC-2023-0071,
//! the Marvin attack). Do not expose [`decrypt_small`] to callers who can
//! submit arbitrary ciphertexts and observe timing or the error returned.

use crate::{
    CryptoError, Result,
    keys::{PrivateKey, PublicKey},
};
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Oaep, Pkcs1v15Encrypt};
use sha2::Sha256;

/// SHA-256 digest length, used to size OAEP overhead
const SHA256_LEN: usize = 32;

/// Padding scheme for RSA encryption of small payloads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RsaPadding {
    /// OAEP with SHA-256 and MGF1-SHA-256
    #[default]
    Oaep,
    /// PKCS#1 v1.5 encryption padding, for interop with legacy peers
    Pkcs1v15,
}

impl RsaPadding {
    /// Bytes of the modulus consumed by padding
    pub fn overhead(&self) -> usize {
        match self {
            Self::Oaep => 2 * SHA256_LEN + 2,
            Self::Pkcs1v15 => 11,
        }
    }

    /// Largest plaintext that fits under a key of `modulus_len` bytes
    pub fn max_message_len(&self, modulus_len: usize) -> usize {
        modulus_len.saturating_sub(self.overhead())
    }
}

/// Sign `data` with RSA-SHA256
pub fn sign(data: &[u8], private_key: &PrivateKey) -> Result<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(private_key.inner().clone());
    let signature = signing_key
        .try_sign(data)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Verify an RSA-SHA256 signature.
///
/// Malformed signatures and mismatches both yield `false`; this never errors.
pub fn verify(data: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
    if signature.len() != public_key.size() {
        return false;
    }
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };
    VerifyingKey::<Sha256>::new(public_key.inner().clone())
        .verify(data, &signature)
        .is_ok()
}

/// Encrypt a payload that fits within the key's modulus
pub fn encrypt_small(data: &[u8], public_key: &PublicKey, padding: RsaPadding) -> Result<Vec<u8>> {
    let max = padding.max_message_len(public_key.size());
    if data.len() > max {
        return Err(CryptoError::DataTooLarge {
            size: data.len() as u64,
            max: max as u64,
        });
    }
    let key = public_key.inner();
    let result = match padding {
        RsaPadding::Oaep => key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), data),
        RsaPadding::Pkcs1v15 => key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data),
    };
    result.map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decrypt a payload produced by [`encrypt_small`]
pub fn decrypt_small(blob: &[u8], private_key: &PrivateKey, padding: RsaPadding) -> Result<Vec<u8>> {
    if blob.len() != private_key.size() {
        return Err(CryptoError::InvalidCiphertext(format!(
            "RSA ciphertext must be {} bytes, got {}",
            private_key.size(),
            blob.len()
        )));
    }
    let key = private_key.inner();
    let result = match padding {
        RsaPadding::Oaep => key.decrypt(Oaep::new::<Sha256>(), blob),
        RsaPadding::Pkcs1v15 => key.decrypt(Pkcs1v15Encrypt, blob),
    };
    result.map_err(|e| CryptoError::Decryption(e.to_string()))
}

/// Signs with one private key and verifies against one public key
#[derive(Clone, Debug)]
pub struct SignatureEngine {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
}

impl SignatureEngine {
    /// Engine that can both sign and verify
    pub fn new(private_key: PrivateKey, public_key: PublicKey) -> Self {
        Self {
            private_key: Some(private_key),
            public_key,
        }
    }

    /// Engine that can only verify
    pub fn verify_only(public_key: PublicKey) -> Self {
        Self {
            private_key: None,
            public_key,
        }
    }

    fn private_key(&self) -> Result<&PrivateKey> {
        self.private_key
            .as_ref()
            .ok_or_else(|| CryptoError::InvalidKey("no private key configured".to_string()))
    }

    /// Sign with the configured private key
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        sign(data, self.private_key()?)
    }

    /// Verify against the configured public key
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        verify(data, signature, &self.public_key)
    }

    /// Encrypt for the configured public key
    pub fn encrypt_small(&self, data: &[u8], padding: RsaPadding) -> Result<Vec<u8>> {
        encrypt_small(data, &self.public_key, padding)
    }

    /// Decrypt with the configured private key
    pub fn decrypt_small(&self, blob: &[u8], padding: RsaPadding) -> Result<Vec<u8>> {
        decrypt_small(blob, self.private_key()?, padding)
    }

    /// The public key signatures are checked against
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Length of signatures this engine expects
    pub fn signature_len(&self) -> usize {
        self.public_key.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::tests::{other_keypair, test_keypair};

    #[test]
    fn test_sign_verify() {
        let pair = test_keypair();
        let signature = sign(b"payload", pair.private_key()).unwrap();
        assert_eq!(signature.len(), 256);
        assert!(verify(b"payload", &signature, pair.public_key()));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let pair = test_keypair();
        let a = sign(b"same", pair.private_key()).unwrap();
        let b = sign(b"same", pair.private_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_verify_rejects_modified_data() {
        let pair = test_keypair();
        let signature = sign(b"payload", pair.private_key()).unwrap();
        assert!(!verify(b"payload!", &signature, pair.public_key()));
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let signature = sign(b"payload", test_keypair().private_key()).unwrap();
        assert!(!verify(b"payload", &signature, other_keypair().public_key()));
    }

    #[test]
    fn test_verify_never_errors_on_garbage() {
        let pair = test_keypair();
        assert!(!verify(b"payload", &[], pair.public_key()));
        assert!(!verify(b"payload", &[0u8; 64], pair.public_key()));
        assert!(!verify(b"payload", &[0xFFu8; 256], pair.public_key()));
    }

    #[test]
    fn test_small_encryption_roundtrip() {
        let pair = test_keypair();
        for padding in [RsaPadding::Oaep, RsaPadding::Pkcs1v15] {
            let blob = encrypt_small(b"session secret", pair.public_key(), padding).unwrap();
            assert_eq!(blob.len(), 256);
            let plain = decrypt_small(&blob, pair.private_key(), padding).unwrap();
            assert_eq!(plain, b"session secret");
        }
    }

    #[test]
    fn test_small_encryption_size_limit() {
        let pair = test_keypair();
        let max = RsaPadding::Oaep.max_message_len(256);
        assert_eq!(max, 190);
        assert!(encrypt_small(&vec![1u8; max], pair.public_key(), RsaPadding::Oaep).is_ok());

        let result = encrypt_small(&vec![1u8; max + 1], pair.public_key(), RsaPadding::Oaep);
        assert!(matches!(
            result,
            Err(CryptoError::DataTooLarge { size: 191, max: 190 })
        ));
    }

    #[test]
    fn test_decrypt_small_wrong_key() {
        let blob = encrypt_small(b"secret", test_keypair().public_key(), RsaPadding::Oaep).unwrap();
        let result = decrypt_small(&blob, other_keypair().private_key(), RsaPadding::Oaep);
        assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn test_verify_only_engine_cannot_sign() {
        let engine = SignatureEngine::verify_only(test_keypair().public_key().clone());
        assert!(matches!(engine.sign(b"x"), Err(CryptoError::InvalidKey(_))));

        let signature = sign(b"x", test_keypair().private_key()).unwrap();
        assert!(engine.verify(b"x", &signature));
        assert_eq!(engine.signature_len(), 256);
    }
}
