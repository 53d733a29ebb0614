//! # Ingest Buffer
//!
//! Bounded in-memory ring of recent merged records, shared between the
//! ingest path and the memory fallback of the read path.
//!
//! One `RwLock` guards the ring. Append and eviction happen in a single
//! write-locked step; readers snapshot under the read lock.

use std::fmt;

use contracts::{BatchOrigin, MergedRecord, QueryPage, RecordFilter};
use parking_lot::RwLock;
use ringbuf::{traits::*, HeapRb};
use tracing::debug;

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 1000;

/// Record plus the batch it came from
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedRecord {
    pub origin: BatchOrigin,
    pub record: MergedRecord,
}

/// Result of one append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Buffer length after the append
    pub len: usize,
    /// Records evicted by this append
    pub evicted: usize,
}

/// Buffer occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    pub evictions: u64,
}

struct Inner {
    ring: HeapRb<BufferedRecord>,
    evictions: u64,
}

/// Ingest buffer
pub struct IngestBuffer {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl fmt::Debug for IngestBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("IngestBuffer")
            .field("len", &stats.len)
            .field("capacity", &stats.capacity)
            .field("evictions", &stats.evictions)
            .finish()
    }
}

impl Default for IngestBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IngestBuffer {
    /// Create a buffer holding at most `capacity` records (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: RwLock::new(Inner {
                ring: HeapRb::new(capacity),
                evictions: 0,
            }),
            capacity,
        }
    }

    /// Append records in order, evicting the oldest on overflow.
    ///
    /// The whole slice lands under one write lock, so readers see either none
    /// of the batch or all of it.
    ///
    /// # Example
    ///
    /// ```
    /// use contracts::{BatchOrigin, MergedRecord};
    /// use ingest_buffer::IngestBuffer;
    ///
    /// let buffer = IngestBuffer::new(2);
    /// let origin = BatchOrigin {
    ///     message_id: 1,
    ///     session_id: "s1".into(),
    ///     device_id: "phone".into(),
    /// };
    /// let records: Vec<_> = (1..=3).map(|ms| MergedRecord::at_nanos(ms * 1_000_000)).collect();
    ///
    /// let outcome = buffer.append(&origin, &records);
    /// assert_eq!((outcome.len, outcome.evicted), (2, 1));
    /// assert_eq!(buffer.read(10)[0].timestamp_millis(), 2);
    /// ```
    pub fn append(&self, origin: &BatchOrigin, records: &[MergedRecord]) -> AppendOutcome {
        let mut inner = self.inner.write();
        let mut evicted = 0;

        for record in records {
            let entry = BufferedRecord {
                origin: origin.clone(),
                record: record.clone(),
            };
            if inner.ring.push_overwrite(entry).is_some() {
                evicted += 1;
            }
        }
        inner.evictions += evicted as u64;
        let len = inner.ring.occupied_len();
        drop(inner);

        if evicted > 0 {
            debug!(evicted, len, "Ingest buffer evicted oldest records");
        }
        AppendOutcome { len, evicted }
    }

    /// Most recent `limit` records, oldest first
    pub fn read(&self, limit: usize) -> Vec<MergedRecord> {
        let inner = self.inner.read();
        let skip = inner.ring.occupied_len().saturating_sub(limit);
        inner
            .ring
            .iter()
            .skip(skip)
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Most recent `limit` records matching `filter`, oldest first, with
    /// the number of matching records in the buffer
    pub fn read_matching(&self, filter: &RecordFilter, limit: usize) -> QueryPage {
        let inner = self.inner.read();
        let (older, newer) = inner.ring.as_slices();

        let mut total = 0;
        let mut records = Vec::with_capacity(limit.min(inner.ring.occupied_len()));
        for entry in newer.iter().rev().chain(older.iter().rev()) {
            if !filter.matches(&entry.origin) {
                continue;
            }
            total += 1;
            if records.len() < limit {
                records.push(entry.record.clone());
            }
        }
        drop(inner);

        records.reverse();
        QueryPage { records, total }
    }

    pub fn len(&self) -> usize {
        self.inner.read().ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records evicted since construction
    pub fn evictions(&self) -> u64 {
        self.inner.read().evictions
    }

    pub fn stats(&self) -> BufferStats {
        let inner = self.inner.read();
        BufferStats {
            len: inner.ring.occupied_len(),
            capacity: self.capacity,
            evictions: inner.evictions,
        }
    }
}
