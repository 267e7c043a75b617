//! Cipherlock unlock
//!
//! Checks one candidate password against the sealed login payload.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cipherlock_core::{CipherlockConfig, Error, LoginRoutine};

#[derive(Parser)]
#[command(name = "cipherlock")]
#[command(about = "Unlock the sealed login routine with a candidate password")]
#[command(version)]
struct Cli {
    /// Candidate password (may start with '-')
    #[arg(allow_hyphen_values = true)]
    password: Option<String>,

    /// JSON config file (defaults reproduce the shipped payload)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// The stdout line for a login outcome. `None` for errors that are not a
/// verdict on the password.
fn outcome_line(outcome: &cipherlock_core::Result<bool>) -> Option<&'static str> {
    match outcome {
        Ok(true) => Some("Good password!"),
        Ok(false) | Err(Error::LengthMismatch { .. }) => Some("Invalid password!"),
        Err(Error::ChecksumConstraintFailure) => {
            Some("Invalid password! - invalid password checksum")
        }
        Err(Error::IntegrityMismatch { .. }) => Some("Invalid password! - invalid code checksum"),
        Err(_) => None,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cipherlock=warn,cipherlock_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let Some(password) = cli.password else {
        println!("Usage: cipherlock <password>");
        return Ok(());
    };

    let config = CipherlockConfig::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let orchestrator = config
        .orchestrator()
        .context("Configuration does not describe a usable payload")?;

    let outcome = orchestrator.login(password.as_bytes(), &LoginRoutine::reference());
    match outcome_line(&outcome) {
        Some(line) => println!("{}", line),
        None => {
            outcome.context("Unlock failed")?;
        }
    }

    Ok(())
}
