//! Cipherlock seed search
//!
//! Sweeps the 32-bit seed space for generators that reproduce the known
//! fingerprint, and flags the ones that also satisfy the residue filter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cipherlock_core::{CipherlockConfig, RecoveredSeed, Seed, SeedRange};

#[derive(Parser)]
#[command(name = "cipherlock-seeds")]
#[command(about = "Recover generator seeds from a sparse output fingerprint")]
#[command(version)]
struct Cli {
    /// First seed to try (hex with 0x, or decimal)
    #[arg(long, value_parser = parse_number, default_value = "0")]
    start: u64,

    /// One past the last seed to try
    #[arg(long, value_parser = parse_number, default_value = "0x100000000")]
    end: u64,

    /// Worker threads (default: config, then CPU count)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Stop at the lowest match instead of listing all
    #[arg(long)]
    first: bool,

    /// Print the low bytes generated by this seed and exit
    #[arg(long, value_parser = parse_number)]
    dump: Option<u64>,

    /// Number of draws to print with --dump
    #[arg(long, default_value_t = 197)]
    count: usize,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_number(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cipherlock_seeds=info,cipherlock_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_hit(hit: &RecoveredSeed) {
    println!("Seed found: {}", hit.seed);
    if hit.satisfies_constraints {
        println!("Possible solution found: {}", hit.seed);
    }
}

fn dump(seed: u64, count: usize) -> Result<()> {
    let seed = u32::try_from(seed).context("Seed must fit in 32 bits")?;
    let bytes = Seed(seed).generator().low_bytes(count);
    let line: Vec<String> = bytes.iter().map(|b| format!("0x{:02x}", b)).collect();
    println!("Seed: {}, data: {}", Seed(seed), line.join(","));
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Some(seed) = cli.dump {
        return dump(seed, cli.count);
    }

    let mut config = CipherlockConfig::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if cli.first {
        config.stop_at_first = true;
    }

    let range = SeedRange::new(cli.start, cli.end).context("Bad seed range")?;
    let orchestrator = config.orchestrator().context("Bad configuration")?;

    tracing::info!(
        workers = orchestrator.workers(),
        candidates = range.len(),
        "searching seeds"
    );

    if config.stop_at_first {
        match orchestrator.recover(range) {
            Some(hit) => print_hit(&hit),
            None => println!("No seed found"),
        }
        return Ok(());
    }

    let (hits, report) = orchestrator.recover_all(range, print_hit);
    let solutions = hits.iter().filter(|h| h.satisfies_constraints).count();

    tracing::info!(
        seeds = hits.len(),
        solutions,
        tried = report.candidates_tried,
        elapsed_s = report.elapsed.as_secs_f64(),
        speed = format!("{:.0} seeds/s", report.speed()),
        "search complete"
    );

    Ok(())
}
