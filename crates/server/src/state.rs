//! Shared handler state
//!
//! Owned instances injected at startup; nothing here is global.

use std::sync::Arc;

use contracts::{DurableStore, HubConfig, ReadConfig};
use ingest_buffer::IngestBuffer;
use observability::IngestStatsAggregator;
use parking_lot::Mutex;
use store::MeteredStore;

pub struct AppState<S> {
    pub store: Arc<MeteredStore<S>>,
    pub buffer: Arc<IngestBuffer>,
    pub stats: Arc<Mutex<IngestStatsAggregator>>,
    pub read: ReadConfig,
    pub max_body_bytes: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            buffer: Arc::clone(&self.buffer),
            stats: Arc::clone(&self.stats),
            read: self.read.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<S: DurableStore> AppState<S> {
    /// State with a fresh buffer sized from `config`
    pub fn new(store: S, config: &HubConfig) -> Self {
        Self::with_buffer(store, IngestBuffer::new(config.buffer.capacity), config)
    }

    pub fn with_buffer(store: S, buffer: IngestBuffer, config: &HubConfig) -> Self {
        Self {
            store: Arc::new(MeteredStore::new(store)),
            buffer: Arc::new(buffer),
            stats: Arc::new(Mutex::new(IngestStatsAggregator::new())),
            read: config.read.clone(),
            max_body_bytes: config.server.max_body_bytes,
        }
    }
}
