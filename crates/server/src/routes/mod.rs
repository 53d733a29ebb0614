//! HTTP routes

mod data;
mod status;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use contracts::DurableStore;

use crate::state::AppState;

/// Build the application router
pub fn router<S>(state: AppState<S>) -> Router
where
    S: DurableStore + Send + Sync + 'static,
{
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/api/data", get(data::read::<S>).post(data::ingest::<S>))
        .route("/api/status", get(status::status::<S>))
        .route("/health", get(status::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
