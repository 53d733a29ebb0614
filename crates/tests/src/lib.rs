//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Config file to running store wiring
//! - HTTP ingest/read over a real socket
//! - Persistence across restarts and degraded-store fallback

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Provenance, StoreBackend};

    #[test]
    fn test_config_drives_store_selection() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            "[store]\nbackend = \"file\"\npath = {:?}\n[buffer]\ncapacity = 50\n",
            dir.path().display().to_string()
        );

        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.store.backend, StoreBackend::File);

        let store = store::open_store(&config.store).unwrap();
        assert!(matches!(store, store::AnyStore::File(_)));
    }

    #[test]
    fn test_wire_vocabulary() {
        assert_eq!(Provenance::Store.as_str(), "database");
        assert_eq!(Provenance::Memory.as_str(), "memory");
        assert!(normalizer::resolve_kind("Heart Rate").is_some());
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{HubConfig, RecordFilter};
    use ingest_buffer::IngestBuffer;
    use serde_json::{json, Value};
    use server::AppState;
    use store::{DurableStore, FileStore, UnavailableStore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn batch(message_id: i64, session: &str, payload: Value) -> Vec<u8> {
        json!({
            "messageId": message_id,
            "sessionId": session,
            "deviceId": "watch-1",
            "payload": payload,
        })
        .to_string()
        .into_bytes()
    }

    fn motion_at(ms: i64) -> Value {
        json!({
            "name": "accelerometer",
            "time": ms * 1_000_000,
            "values": {"x": ms, "y": 0, "z": 0}
        })
    }

    /// Minimal HTTP/1.1 exchange; returns (status, JSON body)
    async fn http(addr: std::net::SocketAddr, method: &str, path: &str, body: &[u8]) -> (u16, Value) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let head = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8(raw).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap();
        (status, serde_json::from_str(body).unwrap_or(Value::Null))
    }

    /// End-to-end: socket -> ingest -> file store -> read
    #[tokio::test]
    async fn test_e2e_http_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open("file", dir.path()).unwrap();
        let state = AppState::new(store, &HubConfig::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server::serve(listener, state.clone(), async move {
            let _ = stop_rx.await;
        }));

        let payload = json!([
            motion_at(1000),
            {"name": "Heart Rate", "time": 1_000_000_000i64, "values": {"heartRate": 72}},
            {"name": "gps", "time": 2_000_000_000i64, "values": {"lat": 10, "lng": 20}},
        ]);
        let (status, report) = http(addr, "POST", "/api/data", &batch(1, "run", payload)).await;
        assert_eq!(status, 200);
        assert_eq!(report["processed"], 2);
        assert_eq!(report["persisted"], true);

        let (status, read) = http(addr, "GET", "/api/data?sessionId=run", b"").await;
        assert_eq!(status, 200);
        assert_eq!(read["source"], "database");
        assert_eq!(read["total"], 2);
        assert_eq!(read["data"][0]["heartRate"]["bpm"], 72.0);
        assert_eq!(read["data"][1]["location"]["longitude"], 20.0);

        let (status, error) = http(addr, "POST", "/api/data", b"{\"payload\": 3}").await;
        assert_eq!(status, 400);
        assert_eq!(error["error"], "malformed_input");

        let (status, status_report) = http(addr, "GET", "/api/status", b"").await;
        assert_eq!(status, 200);
        assert_eq!(status_report["store"]["available"], true);

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        let summary = state.stats.lock().summary();
        assert_eq!(summary.total_batches, 1);
        assert_eq!(summary.rejected_batches, 1);
    }

    /// Records written before a restart are served by the reopened store
    #[tokio::test]
    async fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = HubConfig::default();

        {
            let state = AppState::new(FileStore::open("file", dir.path()).unwrap(), &config);
            for (id, ms) in [(1, 10), (2, 20), (3, 30)] {
                let body = batch(id, "s1", json!([motion_at(ms)]));
                server::ingest_batch(&state, &body).await.unwrap();
            }
        }

        let state = AppState::new(FileStore::open("file", dir.path()).unwrap(), &config);
        assert!(state.buffer.is_empty());

        let report = server::read_records(&state, &RecordFilter::default(), Some(2)).await;
        assert_eq!(report.source, contracts::Provenance::Store);
        assert_eq!(report.total, 3);
        let millis: Vec<_> = report.data.iter().map(|r| r.timestamp_millis()).collect();
        assert_eq!(millis, [20, 30]);

        let counts = state.store.counts().await.unwrap();
        assert_eq!(counts.devices, 1);
        assert_eq!(counts.sessions, 1);
        assert_eq!(counts.raw_readings, 3);
    }

    /// With the store down, reads come from the bounded buffer
    #[tokio::test]
    async fn test_outage_serves_newest_buffered_records() {
        let state = AppState::with_buffer(
            UnavailableStore::default(),
            IngestBuffer::new(3),
            &HubConfig::default(),
        );

        for ms in 1..=5 {
            let body = batch(ms, "s1", json!([motion_at(ms)]));
            let report = server::ingest_batch(&state, &body).await.unwrap();
            assert!(report.success);
            assert!(!report.persisted);
            assert_eq!(report.storage_errors.len(), 4);
        }

        let report = server::read_records(&state, &RecordFilter::default(), None).await;
        assert_eq!(report.source, contracts::Provenance::Memory);
        let millis: Vec<_> = report.data.iter().map(|r| r.timestamp_millis()).collect();
        assert_eq!(millis, [3, 4, 5]);
        assert_eq!(state.buffer.evictions(), 2);

        let snapshot = state.store.metrics().snapshot();
        assert_eq!(snapshot.write_failures, 20);
        assert_eq!(snapshot.query_failures, 1);
    }
}
