//! # Store
//!
//! Durable store backends behind [`DurableStore`].
//!
//! - [`MemoryStore`]: in-process, indexed per filter key
//! - [`FileStore`]: JSON-lines files with an offset index rebuilt at open
//! - [`UnavailableStore`]: always fails (backend `none`)
//! - [`MeteredStore`]: wrapper counting operation outcomes
//!
//! [`open_store`] picks a backend from [`StoreConfig`](contracts::StoreConfig).

mod any;
mod file;
mod index;
mod memory;
mod metered;
pub mod metrics;
mod rows;
mod unavailable;

pub use any::{open_store, AnyStore};
pub use contracts::{DurableStore, StoreError};
pub use file::FileStore;
pub use index::RecordIndex;
pub use memory::MemoryStore;
pub use metered::MeteredStore;
pub use metrics::{StoreMetrics, StoreMetricsSnapshot};
pub use rows::{StoredReading, StoredRecord};
pub use unavailable::UnavailableStore;
