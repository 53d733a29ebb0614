//! AnyStore - backend selected from configuration

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DurableStore, MergedRecord, QueryPage, RawReading, RecordFilter, SessionUpdate,
    StoreBackend, StoreConfig, StoreCounts, StoreError,
};
use tracing::info;

use crate::{FileStore, MemoryStore, UnavailableStore};

/// One of the built-in backends
#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    File(FileStore),
    Unavailable(UnavailableStore),
}

/// Build the store described by `config`
///
/// # Errors
/// Fails when the file backend has no path or its directory cannot be opened.
pub fn open_store(config: &StoreConfig) -> Result<AnyStore, StoreError> {
    let store = match config.backend {
        StoreBackend::Memory => AnyStore::Memory(MemoryStore::default()),
        StoreBackend::File => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| StoreError::unavailable("file", "no data directory configured"))?;
            AnyStore::File(FileStore::open("file", path)?)
        }
        StoreBackend::None => AnyStore::Unavailable(UnavailableStore::default()),
    };
    info!(backend = config.backend.as_str(), "Store opened");
    Ok(store)
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            AnyStore::Memory($store) => $call,
            AnyStore::File($store) => $call,
            AnyStore::Unavailable($store) => $call,
        }
    };
}

impl DurableStore for AnyStore {
    fn name(&self) -> &str {
        dispatch!(self, store => store.name())
    }

    async fn upsert_device(&self, device_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        dispatch!(self, store => store.upsert_device(device_id, seen_at).await)
    }

    async fn upsert_session(&self, update: &SessionUpdate) -> Result<(), StoreError> {
        dispatch!(self, store => store.upsert_session(update).await)
    }

    async fn insert_raw_readings(
        &self,
        origin: &BatchOrigin,
        readings: &[RawReading],
    ) -> Result<usize, StoreError> {
        dispatch!(self, store => store.insert_raw_readings(origin, readings).await)
    }

    async fn insert_merged_records(
        &self,
        origin: &BatchOrigin,
        records: &[MergedRecord],
    ) -> Result<usize, StoreError> {
        dispatch!(self, store => store.insert_merged_records(origin, records).await)
    }

    async fn query_merged_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<QueryPage, StoreError> {
        dispatch!(self, store => store.query_merged_records(filter, limit).await)
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        dispatch!(self, store => store.counts().await)
    }
}
