//! Sealwire - envelopes, file encryption and keys from the command line

use clap::{Parser, Subcommand};
use sealwire_cli::{KeyEnv, commands};
use sealwire_crypto::{
    CryptoConfig, EnvelopeCodec, PasswordHasher,
    config::DEFAULT_PASSWORD_COST,
    keys::DEFAULT_RSA_BITS,
};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sealwire")]
#[command(about = "Signed, encrypted envelopes and file encryption")]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true, env = "SEALWIRE_DEBUG")]
    debug: bool,

    /// bcrypt cost for password hashing and tokens
    #[arg(long, global = true, default_value_t = DEFAULT_PASSWORD_COST, env = "SEALWIRE_PASSWORD_COST")]
    cost: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key set and print it as .env lines
    Keygen {
        /// RSA modulus size
        #[arg(long, default_value_t = DEFAULT_RSA_BITS)]
        bits: usize,
    },
    /// Encrypt PATH into PATH.encrypted and remove PATH
    EncryptFile { path: PathBuf },
    /// Decrypt PATH.encrypted into PATH and remove PATH.encrypted
    DecryptFile { path: PathBuf },
    /// Seal a JSON document into an envelope
    Seal {
        /// JSON input, stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Envelope output file
        #[arg(long)]
        output: PathBuf,
    },
    /// Open an envelope and print its JSON value
    Open { envelope: PathBuf },
    /// Hash a password with bcrypt
    HashPassword { password: String },
    /// Check a password against a bcrypt hash
    VerifyPassword { password: String, hash: String },
    /// Print a key code
    KeyCode,
    /// Print a backup code
    BackupCode,
    /// Print a bearer token bound to CONTEXT
    Token { context: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("sealwire={0},sealwire_cli={0},sealwire_crypto={0}", log_level).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let env = KeyEnv::from_process();
    let config = CryptoConfig::default().with_password_cost(args.cost);
    let hasher = PasswordHasher::new(config.password_cost);

    match args.command {
        Command::Keygen { bits } => print!("{}", commands::keygen(bits)?),
        Command::EncryptFile { path } => {
            let out = commands::encrypt_file(env.symmetric_key()?, &path).await?;
            println!("{}", out.display());
        }
        Command::DecryptFile { path } => {
            let out = commands::decrypt_file(env.symmetric_key()?, &path).await?;
            println!("{}", out.display());
        }
        Command::Seal { input, output } => {
            let json = match input {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };
            let codec = EnvelopeCodec::new(env.symmetric_key()?, &env.keypair()?).with_config(&config);
            let envelope = commands::seal(&codec, &json)?;
            tokio::fs::write(&output, &envelope).await?;
            tracing::info!(bytes = envelope.len(), path = %output.display(), "Sealed envelope");
        }
        Command::Open { envelope } => {
            let bytes = tokio::fs::read(&envelope).await?;
            let codec = EnvelopeCodec::receive_only(env.symmetric_key()?, env.public_key()?).with_config(&config);
            println!("{}", commands::open(&codec, &bytes)?);
        }
        Command::HashPassword { password } => {
            println!("{}", commands::hash_password(&hasher, &password).await?);
        }
        Command::VerifyPassword { password, hash } => {
            let matches = commands::verify_password(&hasher, &password, &hash).await?;
            println!("{}", matches);
            if !matches {
                std::process::exit(1);
            }
        }
        Command::KeyCode => println!("{}", commands::key_code()),
        Command::BackupCode => println!("{}", commands::backup_code()),
        Command::Token { context } => println!("{}", commands::token(&hasher, &context).await?),
    }

    Ok(())
}
