//! `/health` and `/api/status`

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use contracts::{DurableStore, StoreCounts};
use ingest_buffer::BufferStats;
use observability::IngestSummary;
use serde::Serialize;
use store::StoreMetricsSnapshot;

use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub success: bool,
    pub store: StoreStatus,
    pub buffer: BufferStatus,
    pub ingest: IngestSummary,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<StoreCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub operations: StoreMetricsSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferStatus {
    pub len: usize,
    pub capacity: usize,
    pub evictions: u64,
}

impl From<BufferStats> for BufferStatus {
    fn from(stats: BufferStats) -> Self {
        Self {
            len: stats.len,
            capacity: stats.capacity,
            evictions: stats.evictions,
        }
    }
}

pub async fn status<S>(State(state): State<AppState<S>>) -> Json<StatusReport>
where
    S: DurableStore + Send + Sync + 'static,
{
    let (counts, error) = match state.store.counts().await {
        Ok(counts) => (Some(counts), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let ingest = state.stats.lock().summary();

    Json(StatusReport {
        success: true,
        store: StoreStatus {
            name: state.store.name().to_string(),
            available: error.is_none(),
            counts,
            error,
            operations: state.store.metrics().snapshot(),
        },
        buffer: state.buffer.stats().into(),
        ingest,
        timestamp: Utc::now(),
    })
}
