//! `/api/data`: ingest (POST) and read (GET)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use bytes::Bytes;
use contracts::{DurableStore, RecordFilter};
use serde::Deserialize;

use crate::error::ApiError;
use crate::ingest::{ingest_batch, read_records, IngestReport, ReadReport};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    pub limit: Option<usize>,
    pub session_id: Option<String>,
    pub device_id: Option<String>,
}

pub async fn ingest<S>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<IngestReport>, ApiError>
where
    S: DurableStore + Send + Sync + 'static,
{
    ingest_batch(&state, &body).await.map(Json)
}

pub async fn read<S>(
    State(state): State<AppState<S>>,
    params: Result<Query<ReadParams>, QueryRejection>,
) -> Result<Json<ReadReport>, ApiError>
where
    S: DurableStore + Send + Sync + 'static,
{
    let Query(params) = params.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let filter = RecordFilter {
        session_id: params.session_id,
        device_id: params.device_id,
    };
    Ok(Json(read_records(&state, &filter, params.limit).await))
}
