//! Store metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operation counters for one store
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Successful writes (upserts and inserts)
    write_count: AtomicU64,
    /// Failed writes
    write_failures: AtomicU64,
    /// Successful queries (record queries and counts)
    query_count: AtomicU64,
    /// Failed queries
    query_failures: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&self, ok: bool) {
        let counter = if ok {
            &self.write_count
        } else {
            &self.write_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self, ok: bool) {
        let counter = if ok {
            &self.query_count
        } else {
            &self.query_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            write_count: self.write_count.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            query_count: self.query_count.load(Ordering::Relaxed),
            query_failures: self.query_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of store metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetricsSnapshot {
    pub write_count: u64,
    pub write_failures: u64,
    pub query_count: u64,
    pub query_failures: u64,
}
