//! # Sensor Hub CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading, overrides and validation
//! - HTTP server lifecycle with graceful shutdown
//! - Offline batch normalization

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use contracts::ObservabilitySettings;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{resolve_serve_config, run_normalize, run_serve, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Serve(args) => {
            let config = resolve_serve_config(args)?;
            init_logging(&cli, ObservabilityConfig::from(&config.observability))?;
            log_start();
            run_serve(config).await
        }
        Commands::Validate(args) => {
            init_logging(&cli, ObservabilityConfig::from(&ObservabilitySettings::default()))?;
            log_start();
            run_validate(args)
        }
        Commands::Normalize(args) => {
            init_logging(&cli, ObservabilityConfig::from(&ObservabilitySettings::default()))?;
            log_start();
            run_normalize(args)
        }
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

fn log_start() {
    info!(version = env!("CARGO_PKG_VERSION"), "Sensor hub CLI starting");
}

/// Initialize logging, letting CLI flags override the configured settings
fn init_logging(cli: &Cli, mut config: ObservabilityConfig) -> Result<()> {
    if let Some(format) = cli.log_format {
        config.log_format = format.into();
    }

    if cli.quiet {
        config.default_log_level = "warn".to_string();
    } else {
        match cli.verbose {
            0 => {}
            1 => config.default_log_level = "debug".to_string(),
            _ => config.default_log_level = "trace".to_string(),
        }
    }

    observability::init_with_config(config)
}
