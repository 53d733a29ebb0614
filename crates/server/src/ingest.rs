//! Ingest and read pipelines
//!
//! Transport-agnostic; the HTTP handlers are thin wrappers around these.

use std::time::Instant;

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DurableStore, MergedRecord, Provenance, RawBatch, RecordFilter, SessionUpdate,
    StoreError,
};
use normalizer::{aggregate, Aggregation};
use observability::IngestSample;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// One failed store operation during ingest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageFailure {
    pub operation: &'static str,
    pub message: String,
}

/// Ingest result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub success: bool,
    /// Merged records produced
    pub processed: usize,
    /// Buffer length after the append
    pub buffer_size: usize,
    /// Raw readings in the batch
    pub raw_readings: usize,
    /// Distinct raw sensor names, sorted
    pub sensor_types: Vec<String>,
    /// Distinct unrecognized sensor names, sorted
    pub unrecognized: Vec<String>,
    /// Every store operation succeeded
    pub persisted: bool,
    /// Merged records written to the store
    pub saved_to_db: usize,
    pub storage_errors: Vec<StorageFailure>,
    pub timestamp: DateTime<Utc>,
}

/// Read result
#[derive(Debug, Clone, Serialize)]
pub struct ReadReport {
    pub success: bool,
    /// Oldest first
    pub data: Vec<MergedRecord>,
    pub total: usize,
    pub source: Provenance,
    pub timestamp: DateTime<Utc>,
}

/// Decode, normalize, buffer and persist one batch.
///
/// A malformed body is rejected with no effect. Once decoded, the batch is
/// always buffered; store failures are collected into the report instead of
/// failing the call.
///
/// # Errors
/// `ApiError::MalformedInput` when the body is not a `RawBatch`.
#[instrument(name = "ingest_batch", skip(state, body), fields(bytes = body.len()))]
pub async fn ingest_batch<S>(state: &AppState<S>, body: &[u8]) -> Result<IngestReport, ApiError>
where
    S: DurableStore + Sync,
{
    let started = Instant::now();

    let batch = match RawBatch::from_json(body) {
        Ok(batch) => batch,
        Err(e) => {
            let err = ApiError::from(e);
            warn!(error = %err, "Rejected batch");
            observability::record_batch_rejected(err.kind());
            state.stats.lock().record_rejected();
            return Err(err);
        }
    };

    let origin = batch.origin();
    let aggregation = aggregate(&batch.payload);

    let appended = state.buffer.append(&origin, &aggregation.records);
    observability::record_buffer(appended.len, state.buffer.capacity(), appended.evicted);

    let now = Utc::now();
    let mut failures = Vec::new();
    let saved_to_db = persist(state, &batch, &origin, &aggregation, now, &mut failures).await;

    let mut unrecognized: Vec<String> = aggregation
        .unrecognized
        .iter()
        .map(|r| r.name.clone())
        .collect();
    let sample = IngestSample {
        readings: batch.payload.len(),
        records: &aggregation.records,
        unrecognized: &unrecognized,
        storage_errors: failures.len(),
        latency_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    observability::record_ingest(&sample);
    state.stats.lock().update(&sample);

    unrecognized.sort();
    unrecognized.dedup();
    if !unrecognized.is_empty() {
        warn!(names = ?unrecognized, "Unrecognized sensors in batch");
    }

    info!(
        message_id = origin.message_id,
        session_id = %origin.session_id,
        device_id = %origin.device_id,
        readings = batch.payload.len(),
        records = aggregation.records.len(),
        buffer_size = appended.len,
        storage_errors = failures.len(),
        "Batch ingested"
    );

    Ok(IngestReport {
        success: true,
        processed: aggregation.records.len(),
        buffer_size: appended.len,
        raw_readings: batch.payload.len(),
        sensor_types: aggregation.sensor_names,
        unrecognized,
        persisted: failures.is_empty(),
        saved_to_db,
        storage_errors: failures,
        timestamp: now,
    })
}

/// Run every store operation for a batch, collecting failures.
///
/// Returns the number of merged records written.
async fn persist<S>(
    state: &AppState<S>,
    batch: &RawBatch,
    origin: &BatchOrigin,
    aggregation: &Aggregation,
    now: DateTime<Utc>,
    failures: &mut Vec<StorageFailure>,
) -> usize
where
    S: DurableStore + Sync,
{
    let store = &state.store;

    let result = store.upsert_device(&origin.device_id, now).await;
    note("upsert_device", result, failures);

    let update = SessionUpdate {
        session_id: origin.session_id.clone(),
        device_id: origin.device_id.clone(),
        sensor_names: aggregation.sensor_names.clone(),
        points: batch.payload.len() as u64,
        seen_at: now,
    };
    let result = store.upsert_session(&update).await;
    note("upsert_session", result, failures);

    let result = store.insert_raw_readings(origin, &batch.payload).await;
    note("insert_raw_readings", result, failures);

    let result = store.insert_merged_records(origin, &aggregation.records).await;
    note("insert_merged_records", result, failures).unwrap_or(0)
}

fn note<T>(
    operation: &'static str,
    result: Result<T, StoreError>,
    failures: &mut Vec<StorageFailure>,
) -> Option<T> {
    observability::record_store_op(operation, result.is_ok());
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            failures.push(StorageFailure {
                operation,
                message: e.to_string(),
            });
            None
        }
    }
}

/// Most recent records, from the store or, if it fails, from the buffer
#[instrument(name = "read_records", skip(state))]
pub async fn read_records<S>(
    state: &AppState<S>,
    filter: &RecordFilter,
    requested: Option<usize>,
) -> ReadReport
where
    S: DurableStore + Sync,
{
    let limit = state.read.clamp(requested);

    let (page, source) = match state.store.query_merged_records(filter, limit).await {
        Ok(page) => {
            observability::record_store_op("query_merged_records", true);
            (page, Provenance::Store)
        }
        Err(e) => {
            observability::record_store_op("query_merged_records", false);
            warn!(error = %e, "Store query failed, serving from memory");
            (state.buffer.read_matching(filter, limit), Provenance::Memory)
        }
    };

    debug!(
        limit,
        returned = page.records.len(),
        total = page.total,
        source = source.as_str(),
        "Read served"
    );
    observability::record_read(source.as_str(), page.records.len());

    ReadReport {
        success: true,
        data: page.records,
        total: page.total,
        source,
        timestamp: Utc::now(),
    }
}
