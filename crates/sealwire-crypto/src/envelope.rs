//! The secure envelope: one opaque blob per value, safe to send over an
//! untrusted channel.
//!
//! ## Wire format
//!
//! ```text
//! packed    = MessagePack(value)
//! text      = base64(IV ‖ AES-256-CBC(packed))
//! signature = RSA-SHA256(text)
//! body      = text ‖ signature ‖ u16_be(len(signature))
//! envelope  = gzip(body)
//! ```
//!
//! No key id or algorithm tag travels with the envelope; both ends are
//! provisioned with the same symmetric key and matching RSA halves.
//!
//! [`EnvelopeCodec::deserialize`] fails closed: anything other than a
//! canonical, correctly signed envelope yields `None`.

use crate::{
    CryptoError, Result,
    codec,
    config::CryptoConfig,
    keys::{KeyPair, PublicKey, SymmetricKey},
    signature::SignatureEngine,
    symmetric::Cipher,
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

/// Width of the trailing signature-length field
const SIG_LEN_FIELD: usize = 2;

/// Why an envelope was refused
#[derive(Debug, Error)]
pub enum IntegrityFailure {
    /// Not gzip, corrupt, or over the size cap
    #[error("decompression failed: {0}")]
    Decompress(CryptoError),

    /// Decompresses, but is not the exact encoding this codec produces
    #[error("non-canonical encoding")]
    NonCanonical,

    /// Body too short or signature length field inconsistent
    #[error("malformed framing: {0}")]
    Framing(String),

    /// Signature does not verify under the configured public key
    #[error("signature mismatch")]
    BadSignature,

    /// Signed text did not decrypt
    #[error("decryption failed: {0}")]
    Decrypt(CryptoError),

    /// Plaintext is not a valid encoding of the requested type
    #[error("decoding failed: {0}")]
    Decode(CryptoError),
}

/// Serializes values into signed, encrypted, compressed envelopes and back
#[derive(Clone, Debug)]
pub struct EnvelopeCodec {
    cipher: Cipher,
    signatures: SignatureEngine,
    compression_level: u32,
    max_envelope_size: usize,
}

impl EnvelopeCodec {
    /// Codec that signs and verifies with the same key pair
    pub fn new(key: SymmetricKey, keypair: &KeyPair) -> Self {
        Self::with_engines(
            Cipher::new(key),
            SignatureEngine::new(keypair.private_key().clone(), keypair.public_key().clone()),
        )
    }

    /// Codec that can only open envelopes signed by the holder of `public_key`
    pub fn receive_only(key: SymmetricKey, public_key: PublicKey) -> Self {
        Self::with_engines(Cipher::new(key), SignatureEngine::verify_only(public_key))
    }

    /// Codec from prebuilt engines
    pub fn with_engines(cipher: Cipher, signatures: SignatureEngine) -> Self {
        let config = CryptoConfig::default();
        Self {
            cipher,
            signatures,
            compression_level: config.compression_level,
            max_envelope_size: config.max_envelope_size,
        }
    }

    /// Apply compression level and size cap from `config`
    pub fn with_config(mut self, config: &CryptoConfig) -> Self {
        self.compression_level = config.compression_level;
        self.max_envelope_size = config.max_envelope_size;
        self
    }

    /// Seal `value` into an envelope
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let packed = codec::pack(value)?;
        let text = self.cipher.encrypt_to_text(&packed)?;
        let signature = self.signatures.sign(text.as_bytes())?;
        let sig_len = u16::try_from(signature.len()).map_err(|_| CryptoError::DataTooLarge {
            size: signature.len() as u64,
            max: u16::MAX as u64,
        })?;

        let mut body = Vec::with_capacity(text.len() + signature.len() + SIG_LEN_FIELD);
        body.extend_from_slice(text.as_bytes());
        body.extend_from_slice(&signature);
        body.extend_from_slice(&sig_len.to_be_bytes());

        codec::compress(&body, self.compression_level)
    }

    /// Open an envelope, returning `None` for anything untrustworthy.
    ///
    /// Never errors and never panics on hostile input; the rejection reason is
    /// logged at debug level.
    pub fn deserialize<T: DeserializeOwned>(&self, envelope: &[u8]) -> Option<T> {
        match self.open(envelope) {
            Ok(value) => Some(value),
            Err(failure) => {
                debug!(reason = %failure, envelope_len = envelope.len(), "Rejected envelope");
                None
            }
        }
    }

    /// Open an envelope, reporting why it was refused.
    ///
    /// Diagnostic counterpart of [`EnvelopeCodec::deserialize`]; the reason
    /// must not be echoed back to the peer.
    pub fn open<T: DeserializeOwned>(&self, envelope: &[u8]) -> std::result::Result<T, IntegrityFailure> {
        let body = codec::decompress(envelope, self.max_envelope_size)
            .map_err(IntegrityFailure::Decompress)?;

        let (text, signature) = self.split_body(&body)?;
        if !self.signatures.verify(text, signature) {
            return Err(IntegrityFailure::BadSignature);
        }

        // gzip headers and deflate padding bits are malleable; only accept
        // the exact bytes this codec would have emitted for `body`. Only signed
        // bodies get this far.
        let canonical = codec::compress(&body, self.compression_level)
            .map_err(IntegrityFailure::Decompress)?;
        if canonical != envelope {
            return Err(IntegrityFailure::NonCanonical);
        }

        let packed = self.cipher.decrypt_text(text).map_err(IntegrityFailure::Decrypt)?;
        codec::unpack(&packed).map_err(IntegrityFailure::Decode)
    }

    fn split_body<'a>(&self, body: &'a [u8]) -> std::result::Result<(&'a [u8], &'a [u8]), IntegrityFailure> {
        if body.len() < SIG_LEN_FIELD {
            return Err(IntegrityFailure::Framing(format!(
                "body of {} bytes has no length field",
                body.len()
            )));
        }
        let (rest, len_field) = body.split_at(body.len() - SIG_LEN_FIELD);
        let sig_len = u16::from_be_bytes([len_field[0], len_field[1]]) as usize;

        let expected = self.signatures.signature_len();
        if sig_len != expected {
            return Err(IntegrityFailure::Framing(format!(
                "signature length {} does not match key size {}",
                sig_len, expected
            )));
        }
        if rest.len() < sig_len {
            return Err(IntegrityFailure::Framing(format!(
                "body of {} bytes cannot hold a {}-byte signature",
                body.len(),
                sig_len
            )));
        }
        Ok(rest.split_at(rest.len() - sig_len))
    }
}
