//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{HubConfig, StoreBackend};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    bind: String,
    store: &'static str,
    buffer_capacity: usize,
    default_limit: usize,
    max_limit: usize,
    metrics_port: Option<u16>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path, format!("File not found: {}", args.config.display()));
    }

    let checked = config_loader::ConfigLoader::load_from_path(&args.config).and_then(|config| {
        config_loader::ConfigLoader::validate(&config)?;
        Ok(config)
    });

    match checked {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    bind: config.server.bind.clone(),
                    store: config.store.backend.as_str(),
                    buffer_capacity: config.buffer.capacity,
                    default_limit: config.read.default_limit,
                    max_limit: config.read.max_limit,
                    metrics_port: config.observability.metrics_port,
                }),
            }
        }
        Err(e) => invalid(config_path, e.to_string()),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &HubConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match config.store.backend {
        StoreBackend::Memory => {
            warnings.push("store.backend = memory - data is lost on restart".to_string());
        }
        StoreBackend::None => {
            warnings.push(
                "store.backend = none - every batch reports storage errors, reads use the buffer"
                    .to_string(),
            );
        }
        StoreBackend::File => {}
    }

    if config.store.backend != StoreBackend::File && config.store.path.is_some() {
        warnings.push("store.path is ignored unless store.backend = file".to_string());
    }

    if config.read.max_limit > config.buffer.capacity {
        warnings.push(format!(
            "read.max_limit ({}) exceeds buffer.capacity ({}) - fallback reads return at most {}",
            config.read.max_limit, config.buffer.capacity, config.buffer.capacity
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Bind: {}", summary.bind);
            println!("  Store: {}", summary.store);
            println!("  Buffer capacity: {}", summary.buffer_capacity);
            println!("  Read limit: {} (max {})", summary.default_limit, summary.max_limit);
            match summary.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
