//! `normalize` command: run a saved batch through the aggregator offline.

use std::fs;

use anyhow::{Context, Result};
use contracts::{MergedRecord, RawBatch};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::NormalizeArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizeOutput {
    session_id: String,
    device_id: String,
    raw_readings: usize,
    unrecognized: Vec<String>,
    records: Vec<MergedRecord>,
}

/// Execute the `normalize` command
pub fn run_normalize(args: &NormalizeArgs) -> Result<()> {
    let output = normalize_file(args)?;

    if !output.unrecognized.is_empty() {
        warn!(names = ?output.unrecognized, "Batch contains unrecognized sensors");
    }
    info!(
        readings = output.raw_readings,
        records = output.records.len(),
        "Batch normalized"
    );

    let json = if args.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .context("Failed to serialize records")?;

    match &args.output {
        Some(path) => fs::write(path, json).map_err(CliError::from)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn normalize_file(args: &NormalizeArgs) -> Result<NormalizeOutput, CliError> {
    let body = fs::read(&args.input).map_err(|e| CliError::input(&args.input, e.to_string()))?;
    let batch = RawBatch::from_json(&body).map_err(|e| CliError::input(&args.input, e.to_string()))?;

    let mut aggregation = normalizer::aggregate(&batch.payload);
    let mut unrecognized: Vec<String> = aggregation
        .unrecognized
        .drain(..)
        .map(|reading| reading.name)
        .collect();
    unrecognized.sort();
    unrecognized.dedup();

    Ok(NormalizeOutput {
        session_id: batch.session_id,
        device_id: batch.device_id,
        raw_readings: batch.payload.len(),
        unrecognized,
        records: aggregation.records,
    })
}
