//! MeteredStore - counts outcomes of every call on a wrapped store

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DurableStore, MergedRecord, QueryPage, RawReading, RecordFilter, SessionUpdate,
    StoreCounts, StoreError,
};
use tracing::warn;

use crate::metrics::StoreMetrics;

/// Store wrapper recording success/failure per operation
#[derive(Debug)]
pub struct MeteredStore<S> {
    inner: S,
    metrics: StoreMetrics,
}

impl<S: DurableStore> MeteredStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            metrics: StoreMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn observe_write<T>(
        &self,
        operation: &'static str,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.metrics.record_write(result.is_ok());
        if let Err(e) = &result {
            warn!(store = %self.inner.name(), operation, error = %e, "Store write failed");
        }
        result
    }

    fn observe_query<T>(
        &self,
        operation: &'static str,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.metrics.record_query(result.is_ok());
        if let Err(e) = &result {
            warn!(store = %self.inner.name(), operation, error = %e, "Store query failed");
        }
        result
    }
}

impl<S: DurableStore + Sync> DurableStore for MeteredStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn upsert_device(&self, device_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = self.inner.upsert_device(device_id, seen_at).await;
        self.observe_write("upsert_device", result)
    }

    async fn upsert_session(&self, update: &SessionUpdate) -> Result<(), StoreError> {
        let result = self.inner.upsert_session(update).await;
        self.observe_write("upsert_session", result)
    }

    async fn insert_raw_readings(
        &self,
        origin: &BatchOrigin,
        readings: &[RawReading],
    ) -> Result<usize, StoreError> {
        let result = self.inner.insert_raw_readings(origin, readings).await;
        self.observe_write("insert_raw_readings", result)
    }

    async fn insert_merged_records(
        &self,
        origin: &BatchOrigin,
        records: &[MergedRecord],
    ) -> Result<usize, StoreError> {
        let result = self.inner.insert_merged_records(origin, records).await;
        self.observe_write("insert_merged_records", result)
    }

    async fn query_merged_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<QueryPage, StoreError> {
        let result = self.inner.query_merged_records(filter, limit).await;
        self.observe_query("query_merged_records", result)
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let result = self.inner.counts().await;
        self.observe_query("counts", result)
    }
}
