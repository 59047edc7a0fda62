//! # Sealwire CLI
//!
//! Command-line front end for `sealwire-crypto`: key generation, file
//! encryption, envelope sealing and opening, password hashing and code
//! generation. Keys come from `SEALWIRE_*` environment variables or a
//! `.env` file.

pub mod commands;
pub mod config;
pub mod error;

pub use config::KeyEnv;
pub use error::{CliError, Result};
