//! Voiceveil CLI - Spectral Voice Anonymizer
//!
//! Command-line interface for the Voiceveil anonymization pipeline.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use voiceveil::cli::commands;
use voiceveil::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Voiceveil v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Voiceveil v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Anonymize {
            input,
            output,
            settings,
            seed,
            overrides,
        } => {
            commands::anonymize(
                &input,
                output.as_deref(),
                settings.as_deref(),
                seed,
                &overrides,
            )
            .map_err(|e| {
                for suggestion in e.recovery_suggestions() {
                    error!("  - {}", suggestion);
                }
                e
            })
            .with_context(|| format!("failed to anonymize {}", input.display()))?;
        }
        Commands::Settings { output } => {
            commands::print_settings(output.as_deref()).context("failed to print settings")?;
        }
        Commands::Inspect { path } => {
            commands::inspect(&path)
                .with_context(|| format!("failed to inspect {}", path.display()))?;
        }
    }

    Ok(())
}
