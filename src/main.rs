//! # Voxline — voice-call scheduling relay
//!
//! Receives webhook events from a voice-assistant platform, tracks meeting
//! details as they surface during each call, and books exactly one Google
//! Calendar event per call once the details are complete.
//!
//! Usage:
//!   voxline                       # Start the webhook relay server
//!   voxline serve --verbose       # Same, with debug logging
//!   voxline provision             # Register the assistant with the platform

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voxline_core::VoxlineConfig;

mod provision;

#[derive(Parser)]
#[command(
    name = "voxline",
    version,
    about = "📅 Voxline — voice call events in, calendar bookings out"
)]
struct Cli {
    /// Path to config file (default: ~/.voxline/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON (for log shippers)
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the webhook relay server (default)
    Serve,
    /// Create the scheduling assistant on the voice platform
    Provision,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "voxline=debug,tower_http=debug"
    } else {
        "voxline=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = match &cli.config {
        Some(path) => VoxlineConfig::load_from(path)?,
        None => VoxlineConfig::load()?,
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => voxline_gateway::start(&config).await,
        Command::Provision => provision::run(&config.platform).await,
    }
}
