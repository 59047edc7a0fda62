//! Tunables shared by the engines

use crate::{DEFAULT_CHUNK_SIZE, codec::MAX_COMPRESSION_LEVEL};

/// Default bcrypt cost factor
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Default cap on the decompressed size of an incoming envelope (64 MiB).
///
/// Also bounds the CPU spent opening one envelope: every body is inflated, and
/// a signed one is then recompressed at the configured level.
pub const DEFAULT_MAX_ENVELOPE_SIZE: usize = 64 * 1024 * 1024;

/// Crypto configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CryptoConfig {
    /// bcrypt cost used by `hash_password` and token generation
    pub password_cost: u32,
    /// gzip level applied to outgoing envelopes
    pub compression_level: u32,
    /// Largest decompressed envelope body accepted
    pub max_envelope_size: usize,
    /// Read buffer size for file encryption
    pub chunk_size: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            password_cost: DEFAULT_PASSWORD_COST,
            compression_level: MAX_COMPRESSION_LEVEL,
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl CryptoConfig {
    /// Set the bcrypt cost
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Set the gzip level, clamped to 9
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(MAX_COMPRESSION_LEVEL);
        self
    }

    /// Set the envelope size cap
    pub fn with_max_envelope_size(mut self, max: usize) -> Self {
        self.max_envelope_size = max;
        self
    }

    /// Set the file read chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
