//! CLI error types

use sealwire_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by the `sealwire` binary
#[derive(Error, Debug)]
pub enum CliError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("envelope rejected")]
    EnvelopeRejected,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
