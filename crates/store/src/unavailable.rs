//! UnavailableStore - backend `none`
//!
//! Every operation fails, so ingest degrades to buffer-only and reads fall
//! back to memory.

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DurableStore, MergedRecord, QueryPage, RawReading, RecordFilter, SessionUpdate,
    StoreCounts, StoreError,
};

#[derive(Debug, Clone)]
pub struct UnavailableStore {
    name: String,
    reason: String,
}

impl Default for UnavailableStore {
    fn default() -> Self {
        Self::new("none", "no durable store configured")
    }
}

impl UnavailableStore {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::unavailable(&self.name, &self.reason)
    }
}

impl DurableStore for UnavailableStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert_device(&self, _device_id: &str, _seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn upsert_session(&self, _update: &SessionUpdate) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn insert_raw_readings(
        &self,
        _origin: &BatchOrigin,
        _readings: &[RawReading],
    ) -> Result<usize, StoreError> {
        Err(self.error())
    }

    async fn insert_merged_records(
        &self,
        _origin: &BatchOrigin,
        _records: &[MergedRecord],
    ) -> Result<usize, StoreError> {
        Err(self.error())
    }

    async fn query_merged_records(
        &self,
        _filter: &RecordFilter,
        _limit: usize,
    ) -> Result<QueryPage, StoreError> {
        Err(self.error())
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        Err(self.error())
    }
}
