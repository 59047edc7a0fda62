//! Key material from the environment
//!
//! PEM values may be given verbatim or base64-wrapped onto a single line,
//! which is how `sealwire keygen` prints them for `.env` files.

use crate::error::{CliError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sealwire_crypto::{KeyPair, KeySet, PrivateKey, PublicKey, SymmetricKey};

/// Base64 symmetric key
pub const KEY_VAR: &str = "SEALWIRE_KEY";

/// SPKI PEM public key
pub const PUBLIC_KEY_VAR: &str = "SEALWIRE_PUBLIC_KEY";

/// PKCS#8 PEM private key
pub const PRIVATE_KEY_VAR: &str = "SEALWIRE_PRIVATE_KEY";

const PEM_PREFIX: &str = "-----BEGIN";

/// Reads key variables through `lookup`, normally the process environment
pub struct KeyEnv<F> {
    lookup: F,
}

impl KeyEnv<fn(&str) -> Option<String>> {
    /// Read from the process environment
    pub fn from_process() -> Self {
        Self::new(|name: &str| std::env::var(name).ok())
    }
}

impl<F> KeyEnv<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    fn require(&self, var: &'static str) -> Result<String> {
        match (self.lookup)(var) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(CliError::MissingVar(var)),
        }
    }

    fn pem(&self, var: &'static str) -> Result<String> {
        let value = self.require(var)?;
        if value.starts_with(PEM_PREFIX) {
            return Ok(value);
        }
        let decoded = STANDARD.decode(&value).map_err(|e| invalid(var, e))?;
        String::from_utf8(decoded).map_err(|e| invalid(var, e))
    }

    /// The shared symmetric key
    pub fn symmetric_key(&self) -> Result<SymmetricKey> {
        SymmetricKey::from_base64(&self.require(KEY_VAR)?).map_err(|e| invalid(KEY_VAR, e))
    }

    /// The peer's public key
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_pem(&self.pem(PUBLIC_KEY_VAR)?).map_err(|e| invalid(PUBLIC_KEY_VAR, e))
    }

    /// Our key pair; the public half is derived when not given explicitly
    pub fn keypair(&self) -> Result<KeyPair> {
        let private_pem = self.pem(PRIVATE_KEY_VAR)?;
        match (self.lookup)(PUBLIC_KEY_VAR) {
            Some(_) => {
                let public_pem = self.pem(PUBLIC_KEY_VAR)?;
                KeyPair::from_pem(&public_pem, &private_pem).map_err(|e| invalid(PRIVATE_KEY_VAR, e))
            }
            None => PrivateKey::from_pem(&private_pem)
                .map(KeyPair::from_private_key)
                .map_err(|e| invalid(PRIVATE_KEY_VAR, e)),
        }
    }

    /// Symmetric key plus key pair
    pub fn key_set(&self) -> Result<KeySet> {
        Ok(KeySet {
            key: self.symmetric_key()?,
            keypair: self.keypair()?,
        })
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> CliError {
    CliError::InvalidVar {
        var,
        reason: reason.to_string(),
    }
}

/// Render a key set as `.env` lines
pub fn to_env_lines(keys: &KeySet) -> Result<String> {
    let public_pem = keys.keypair.public_key().to_pem()?;
    let private_pem = keys.keypair.private_key().to_pem()?;
    Ok(format!(
        "{}={}\n{}={}\n{}={}\n",
        KEY_VAR,
        keys.key.to_base64(),
        PUBLIC_KEY_VAR,
        STANDARD.encode(public_pem.as_bytes()),
        PRIVATE_KEY_VAR,
        STANDARD.encode(private_pem.as_bytes()),
    ))
}
