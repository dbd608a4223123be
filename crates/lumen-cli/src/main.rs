//! Lumen CLI - Headless Playback Driver
//!
//! Features:
//! - Session configuration inspection
//! - Scripted replay of surface events, commands and key presses

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Lumen CLI - Playback controller toolkit
#[derive(Parser)]
#[command(name = "lumen-cli")]
#[command(author = "Lumen Contributors")]
#[command(version)]
#[command(about = "Inspect and simulate Lumen playback sessions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the startup selections for a session config
    Inspect {
        /// Path to the session config (JSON)
        config: PathBuf,
    },

    /// Replay a script of events and commands against a session
    Simulate {
        /// Path to the session config (JSON)
        config: PathBuf,

        /// Path to the step script (JSON array)
        #[arg(short, long)]
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(version = lumen_core::VERSION, "lumen-core loaded");

    match cli.command {
        Commands::Inspect { config } => {
            commands::inspect(&config, &cli.format)?;
        }
        Commands::Simulate { config, script } => {
            commands::simulate(&config, &script, &cli.format).await?;
        }
    }

    Ok(())
}
