//! MemoryStore - in-process durable store
//!
//! Survives for the life of the process. Useful as the default backend and
//! in tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DeviceRecord, DurableStore, MergedRecord, QueryPage, RawReading, RecordFilter,
    SessionRecord, SessionUpdate, StoreCounts, StoreError,
};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::index::RecordIndex;
use crate::rows::StoredReading;

#[derive(Debug, Default)]
struct Collections {
    devices: HashMap<String, DeviceRecord>,
    sessions: HashMap<String, SessionRecord>,
    raw_readings: Vec<StoredReading>,
    merged_records: Vec<MergedRecord>,
    index: RecordIndex<usize>,
}

/// In-memory store
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    inner: Mutex<Collections>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(Collections::default()),
        }
    }

    /// Device by id
    pub fn device(&self, device_id: &str) -> Option<DeviceRecord> {
        self.inner.lock().devices.get(device_id).cloned()
    }

    /// Session by id
    pub fn session(&self, session_id: &str) -> Option<SessionRecord> {
        self.inner.lock().sessions.get(session_id).cloned()
    }

    /// Stored raw readings, in insertion order
    pub fn raw_readings(&self) -> Vec<StoredReading> {
        self.inner.lock().raw_readings.clone()
    }
}

impl DurableStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert_device(&self, device_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner
            .devices
            .entry(device_id.to_string())
            .and_modify(|device| device.last_seen = seen_at)
            .or_insert_with(|| DeviceRecord::first_contact(device_id, seen_at));
        Ok(())
    }

    async fn upsert_session(&self, update: &SessionUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner
            .sessions
            .entry(update.session_id.clone())
            .and_modify(|session| session.absorb(update))
            .or_insert_with(|| SessionRecord::start(update));
        Ok(())
    }

    async fn insert_raw_readings(
        &self,
        origin: &BatchOrigin,
        readings: &[RawReading],
    ) -> Result<usize, StoreError> {
        let received_at = Utc::now();
        let mut inner = self.inner.lock();
        inner.raw_readings.extend(
            readings
                .iter()
                .map(|reading| StoredReading::new(origin, reading, received_at)),
        );
        Ok(readings.len())
    }

    #[instrument(
        name = "memory_store_insert_merged",
        skip(self, origin, records),
        fields(store = %self.name, records = records.len())
    )]
    async fn insert_merged_records(
        &self,
        origin: &BatchOrigin,
        records: &[MergedRecord],
    ) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        for record in records {
            let slot = inner.merged_records.len();
            inner.merged_records.push(record.clone());
            inner.index.insert(origin, record.timestamp_millis(), slot);
        }
        debug!(total = inner.merged_records.len(), "Merged records stored");
        Ok(records.len())
    }

    async fn query_merged_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<QueryPage, StoreError> {
        let inner = self.inner.lock();
        let (slots, total) = inner.index.latest(filter, limit);
        let records = slots
            .into_iter()
            .filter_map(|slot| inner.merged_records.get(slot).cloned())
            .collect();
        Ok(QueryPage { records, total })
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let inner = self.inner.lock();
        Ok(StoreCounts {
            devices: inner.devices.len() as u64,
            sessions: inner.sessions.len() as u64,
            raw_readings: inner.raw_readings.len() as u64,
            merged_records: inner.merged_records.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(session: &str, device: &str) -> BatchOrigin {
        BatchOrigin {
            message_id: 1,
            session_id: session.into(),
            device_id: device.into(),
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn records(millis: std::ops::Range<i64>) -> Vec<MergedRecord> {
        millis.map(|ms| MergedRecord::at_nanos(ms * 1_000_000)).collect()
    }

    #[tokio::test]
    async fn test_device_upsert() {
        let store = MemoryStore::default();
        store.upsert_device("d1", at(1)).await.unwrap();
        store.upsert_device("d1", at(5)).await.unwrap();

        let device = store.device("d1").unwrap();
        assert_eq!(device.device_name, "Device d1");
        assert_eq!(device.platform, "Unknown");
        assert_eq!(device.first_seen, at(1));
        assert_eq!(device.last_seen, at(5));
    }

    #[tokio::test]
    async fn test_session_upsert_increments_points() {
        let store = MemoryStore::default();
        let mut update = SessionUpdate {
            session_id: "s1".into(),
            device_id: "d1".into(),
            sensor_names: vec!["accelerometer".into()],
            points: 10,
            seen_at: at(1),
        };
        store.upsert_session(&update).await.unwrap();
        update.points = 5;
        update.sensor_names = vec!["gps".into()];
        store.upsert_session(&update).await.unwrap();

        let session = store.session("s1").unwrap();
        assert_eq!(session.total_data_points, 15);
        assert!(session.is_active);
        assert_eq!(session.sensor_types, ["accelerometer", "gps"]);
    }

    #[tokio::test]
    async fn test_query_latest_chronological() {
        let store = MemoryStore::default();
        store
            .insert_merged_records(&origin("s", "d"), &records(0..1000))
            .await
            .unwrap();

        let page = store
            .query_merged_records(&RecordFilter::default(), 5)
            .await
            .unwrap();
        let millis: Vec<_> = page.records.iter().map(|r| r.timestamp_millis()).collect();
        assert_eq!(millis, vec![995, 996, 997, 998, 999]);
        assert_eq!(page.total, 1000);
    }

    #[tokio::test]
    async fn test_query_filter_by_session() {
        let store = MemoryStore::default();
        store
            .insert_merged_records(&origin("s1", "d"), &records(0..3))
            .await
            .unwrap();
        store
            .insert_merged_records(&origin("s2", "d"), &records(3..5))
            .await
            .unwrap();

        let filter = RecordFilter {
            session_id: Some("s2".into()),
            device_id: None,
        };
        let page = store.query_merged_records(&filter, 100).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].timestamp_millis(), 3);
    }

    #[tokio::test]
    async fn test_counts() {
        let store = MemoryStore::default();
        let readings = vec![
            RawReading::new("gps", 1, Default::default()),
            RawReading::new("unknown_sensor_xyz", 1, Default::default()),
        ];
        store.upsert_device("d", at(0)).await.unwrap();
        store
            .insert_raw_readings(&origin("s", "d"), &readings)
            .await
            .unwrap();
        store
            .insert_merged_records(&origin("s", "d"), &records(0..1))
            .await
            .unwrap();

        let counts = store.counts().await.unwrap();
        assert_eq!(
            counts,
            StoreCounts {
                devices: 1,
                sessions: 0,
                raw_readings: 2,
                merged_records: 1,
            }
        );
        assert_eq!(store.raw_readings()[1].reading.name, "unknown_sensor_xyz");
    }
}
