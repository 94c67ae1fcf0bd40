//! Delegate CLI - origin-bound session delegation from the command line

#![allow(dead_code)] // Public API items may not be used internally

use anyhow::Result;
use clap::{Parser, Subcommand};

mod bundle;
mod commands;
mod config;
mod crypto;
mod issuer;
mod owner_signer;
mod secure_storage;
mod session;
mod storage;




use commands::*;
use config::{Paths, DEFAULT_APPROVAL_TIMEOUT_SECS, DEFAULT_TTL_SECS};

#[derive(Parser)]
#[command(name = "delegate")]
#[command(version)]
#[command(about = "Origin-bound session delegation - sign for a site without exposing your owner key")]
#[command(long_about = r#"
Delegate binds your owner key and a site origin into a contract account.
A site gets a short-lived session key that can only spend from that
account, only for that origin, and only until the delegation expires.

Quick Start:
  1. delegate keygen                          Generate your owner key
  2. delegate address --origin game.example   Derive the contract account
  3. delegate authenticate --origin game.example
  4. delegate sign --session game_example --to <ADDR> --amount 10
  5. delegate verify --bundle tx.json
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: ~/.delegate)
    #[arg(long, global = true)]
    home: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new owner key
    Keygen {
        /// Force overwrite existing key
        #[arg(short, long)]
        force: bool,
    },

    /// Show the contract account bound to an origin
    Address {
        /// Site origin (max 64 bytes)
        #[arg(short, long)]
        origin: String,

        /// Additional owner key (hex), e.g. a recovery key
        #[arg(long)]
        recovery: Vec<String>,
    },

    /// Approve a session for an origin
    Authenticate {
        #[arg(short, long)]
        origin: String,

        #[arg(long)]
        recovery: Vec<String>,

        /// Session lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
        ttl: u64,

        /// Seconds to wait for approval
        #[arg(long, default_value_t = DEFAULT_APPROVAL_TIMEOUT_SECS)]
        timeout: u64,

        /// Session id (default: derived from the origin)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Sign a payment from the contract account with a session key
    Sign {
        #[arg(short, long)]
        session: String,

        /// Receiver address (base58)
        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        amount: u64,

        #[arg(long, default_value_t = 0)]
        fee: u64,

        #[arg(long, default_value_t = 0)]
        first_valid: u64,

        #[arg(long, default_value_t = u64::MAX)]
        last_valid: u64,

        /// Network identifier covered by the transaction id
        #[arg(long, default_value = "")]
        network: String,

        #[arg(long)]
        note: Option<String>,

        /// Write the witness bundle here instead of stdout
        #[arg(long)]
        out: Option<String>,
    },

    /// Run the authorization predicate over a witness bundle
    Verify {
        #[arg(short, long)]
        bundle: String,

        /// Verifier time in unix seconds (default: now)
        #[arg(long)]
        now: Option<u64>,
    },

    /// End a session
    Logout {
        #[arg(short, long)]
        session: String,
    },

    /// Show configuration, owner key and sessions
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::resolve(cli.home.as_deref())?;

    match cli.command {
        Commands::Keygen { force } => {
            keygen::run(&paths, force)?;
        }
        Commands::Address { origin, recovery } => {
            address::run(&paths, &origin, &recovery)?;
        }
        Commands::Authenticate {
            origin,
            recovery,
            ttl,
            timeout,
            session,
        } => {
            authenticate::run(
                &paths,
                authenticate::AuthenticateOptions {
                    origin,
                    recovery,
                    ttl,
                    timeout,
                    session,
                },
            )
            .await?;
        }
        Commands::Sign {
            session,
            to,
            amount,
            fee,
            first_valid,
            last_valid,
            network,
            note,
            out,
        } => {
            sign::run(
                &paths,
                sign::SignOptions {
                    session,
                    to,
                    amount,
                    fee,
                    first_valid,
                    last_valid,
                    network,
                    note,
                    out,
                },
            )?;
        }
        Commands::Verify { bundle, now } => {
            verify::run(&bundle, now)?;
        }
        Commands::Logout { session } => {
            logout::run(&paths, &session)?;
        }
        Commands::Info => {
            info::run(&paths)?;
        }
    }

    Ok(())
}
