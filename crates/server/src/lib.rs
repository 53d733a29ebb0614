//! # Server
//!
//! HTTP surface of the sensor hub (axum).
//!
//! - `POST /api/data`: ingest a raw batch
//! - `GET /api/data?limit=&sessionId=&deviceId=`: recent merged records
//! - `GET /api/status`: store, buffer and ingest statistics
//! - `GET /health`: liveness

pub mod error;
pub mod ingest;
mod routes;
pub mod state;

use std::future::Future;

use anyhow::{Context, Result};
use contracts::DurableStore;
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use ingest::{ingest_batch, read_records, IngestReport, ReadReport, StorageFailure};
pub use routes::router;
pub use state::AppState;

/// Serve until `shutdown` resolves
pub async fn serve<S, F>(listener: TcpListener, state: AppState<S>, shutdown: F) -> Result<()>
where
    S: DurableStore + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().context("getting local address")?;
    info!(addr = %local_addr, "Sensor hub listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("Sensor hub stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use contracts::HubConfig;
    use serde_json::{json, Value};
    use store::{MemoryStore, UnavailableStore};
    use tower::ServiceExt; // for `oneshot`

    fn app<S: DurableStore + Send + Sync + 'static>(store: S) -> (Router, AppState<S>) {
        let state = AppState::new(store, &HubConfig::default());
        (router(state.clone()), state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/data")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn batch(payload: Value) -> Value {
        json!({
            "messageId": 1,
            "sessionId": "s1",
            "deviceId": "phone",
            "payload": payload,
        })
    }

    #[tokio::test]
    async fn test_ingest_then_read() {
        let (app, _) = app(MemoryStore::default());
        let body = batch(json!([
            {"name": "accelerometer", "time": 1_000_000_000i64, "values": {"x": 1, "y": 2, "z": 3}},
            {"name": "gyroscope", "time": 1_000_000_000i64, "values": {"x": 0.1, "y": 0, "z": 0}},
        ]));

        let (status, report) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["success"], true);
        assert_eq!(report["processed"], 1);
        assert_eq!(report["rawReadings"], 2);
        assert_eq!(report["persisted"], true);
        assert_eq!(report["savedToDb"], 1);
        assert_eq!(report["sensorTypes"], json!(["accelerometer", "gyroscope"]));

        let (status, read) = send(&app, get("/api/data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["source"], "database");
        assert_eq!(read["total"], 1);
        let record = &read["data"][0];
        assert_eq!(record["accelerometer"], json!({"x": 1.0, "y": 2.0, "z": 3.0}));
        assert_eq!(record["gyroscope"]["x"], 0.1);
    }

    #[tokio::test]
    async fn test_malformed_batch_has_no_effect() {
        let (app, state) = app(MemoryStore::default());
        let body = batch(json!([{"name": "gyroscope", "values": {}}]));

        let (status, error) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["success"], false);
        assert_eq!(error["error"], "malformed_input");
        assert!(error["details"].as_str().unwrap().contains("time"));

        assert!(state.buffer.is_empty());
        assert_eq!(state.store.counts().await.unwrap().devices, 0);
        assert_eq!(state.stats.lock().rejected_batches, 1);
    }

    #[tokio::test]
    async fn test_not_json_is_bad_request() {
        let (app, _) = app(MemoryStore::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/data")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_sensor_still_succeeds() {
        let (app, state) = app(MemoryStore::default());
        let body = batch(json!([
            {"name": "unknown_sensor_xyz", "time": 5_000_000, "values": {"x": 1}},
        ]));

        let (status, report) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["processed"], 1);
        assert_eq!(report["unrecognized"], json!(["unknown_sensor_xyz"]));

        let (_, read) = send(&app, get("/api/data")).await;
        assert_eq!(read["data"][0], json!({"timestamp": "1970-01-01T00:00:00.005Z"}));

        // still forwarded to raw storage
        assert_eq!(state.store.inner().raw_readings().len(), 1);
    }

    #[tokio::test]
    async fn test_store_down_degrades_to_memory() {
        let (app, state) = app(UnavailableStore::default());
        let body = batch(json!([
            {"name": "GPS", "time": 1_000_000, "values": {"lat": 10, "lng": 20}},
        ]));

        let (status, report) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["persisted"], false);
        assert_eq!(report["savedToDb"], 0);
        assert_eq!(report["bufferSize"], 1);
        assert_eq!(report["storageErrors"].as_array().unwrap().len(), 4);
        assert_eq!(state.buffer.len(), 1);

        let (status, read) = send(&app, get("/api/data?limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["source"], "memory");
        assert_eq!(
            read["data"][0]["location"],
            json!({
                "latitude": 10.0,
                "longitude": 20.0,
                "altitude": 0.0,
                "accuracy": 0.0,
                "speed": 0.0,
                "bearing": 0.0,
            })
        );
    }

    #[tokio::test]
    async fn test_read_limit_and_filters() {
        let (app, _) = app(MemoryStore::default());
        for (session, start) in [("s1", 0i64), ("s2", 100)] {
            let payload: Vec<Value> = (start..start + 10)
                .map(|ms| json!({"name": "barometer", "time": ms * 1_000_000, "values": {"pressure": ms}}))
                .collect();
            let body = json!({
                "messageId": start,
                "sessionId": session,
                "deviceId": "phone",
                "payload": payload,
            });
            let (status, _) = send(&app, post(&body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, read) = send(&app, get("/api/data?limit=3&sessionId=s1")).await;
        assert_eq!(read["total"], 10);
        let pressures: Vec<_> = read["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["barometer"]["pressure"].as_f64().unwrap())
            .collect();
        assert_eq!(pressures, vec![7.0, 8.0, 9.0]);

        let (_, read) = send(&app, get("/api/data?deviceId=tablet")).await;
        assert_eq!(read["total"], 0);
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let mut config = HubConfig::default();
        config.read.max_limit = 2;
        config.read.default_limit = 2;
        let state = AppState::new(MemoryStore::default(), &config);
        let app = router(state);

        let payload: Vec<Value> = (0..5)
            .map(|i| json!({"name": "compass", "time": i, "values": {"magneticBearing": i}}))
            .collect();
        send(&app, post(&batch(json!(payload)))).await;

        let (_, read) = send(&app, get("/api/data?limit=1000")).await;
        assert_eq!(read["data"].as_array().unwrap().len(), 2);
        assert_eq!(read["total"], 5);
    }

    #[tokio::test]
    async fn test_bad_query_is_rejected() {
        let (app, _) = app(MemoryStore::default());
        let (status, error) = send(&app, get("/api/data?limit=-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "invalid_query");
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let (app, _) = app(UnavailableStore::default());
        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = batch(json!([{"name": "thermometer", "time": 1, "values": {}}]));
        send(&app, post(&body)).await;

        let (status, report) = send(&app, get("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["store"]["available"], false);
        assert_eq!(report["store"]["operations"]["writeFailures"], 4);
        assert_eq!(report["buffer"]["len"], 1);
        assert_eq!(report["buffer"]["capacity"], 1000);
        assert_eq!(report["ingest"]["totalBatches"], 1);
        assert_eq!(report["ingest"]["unrecognizedCounts"]["thermometer"], 1);
    }
}
