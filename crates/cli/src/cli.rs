//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sensor Hub - multi-sensor telemetry ingest and normalization
#[derive(Parser, Debug)]
#[command(
    name = "sensor-hub",
    author,
    version,
    about = "Multi-sensor telemetry ingest and normalization hub",
    long_about = "Accepts sensor batches from mobile loggers, aligns readings into \n\
                  per-timestamp records, persists raw and merged data, and serves \n\
                  recent records to polling dashboards."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSOR_HUB_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (defaults to the config file setting, then pretty)
    #[arg(long, value_enum, global = true, env = "SENSOR_HUB_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP ingest/read server
    Serve(ServeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Normalize a saved batch file offline and print merged records
    Normalize(NormalizeArgs),
}

/// Arguments for the `serve` command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults if omitted
    #[arg(short, long, env = "SENSOR_HUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override listen address, e.g. 0.0.0.0:3000
    #[arg(long, env = "SENSOR_HUB_BIND")]
    pub bind: Option<String>,

    /// Override store backend
    #[arg(long, value_enum, env = "SENSOR_HUB_STORE")]
    pub store: Option<StoreArg>,

    /// Override data directory for the file backend
    #[arg(long, env = "SENSOR_HUB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override ingest buffer capacity
    #[arg(long, env = "SENSOR_HUB_BUFFER_CAPACITY")]
    pub buffer_capacity: Option<usize>,

    /// Metrics server port (0 = disabled)
    #[arg(long, env = "SENSOR_HUB_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sensor-hub.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `normalize` command
#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// RawBatch JSON file
    pub input: PathBuf,

    /// Write records here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Store backend selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreArg {
    Memory,
    File,
    None,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

impl From<StoreArg> for contracts::StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Memory => Self::Memory,
            StoreArg::File => Self::File,
            StoreArg::None => Self::None,
        }
    }
}
