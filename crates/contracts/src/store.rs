//! DurableStore trait - persistence collaborator interface
//!
//! Defines the abstract interface for storage backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchOrigin, MergedRecord, RawReading, StoreError};

/// Durable persistence trait
///
/// Every operation fails independently. Implementations use interior
/// mutability so a single instance can be shared by concurrent handlers.
#[trait_variant::make(DurableStore: Send)]
pub trait LocalDurableStore {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Create the device, or refresh its `last_seen`
    async fn upsert_device(&self, device_id: &str, seen_at: DateTime<Utc>)
        -> Result<(), StoreError>;

    /// Create the session, or mark it active and add `points` to its total
    async fn upsert_session(&self, update: &SessionUpdate) -> Result<(), StoreError>;

    /// Append raw readings verbatim, including unrecognized ones
    ///
    /// Returns the number of readings written.
    async fn insert_raw_readings(
        &self,
        origin: &BatchOrigin,
        readings: &[RawReading],
    ) -> Result<usize, StoreError>;

    /// Append merged records
    ///
    /// Returns the number of records written.
    async fn insert_merged_records(
        &self,
        origin: &BatchOrigin,
        records: &[MergedRecord],
    ) -> Result<usize, StoreError>;

    /// Most recent `limit` records matching `filter`, oldest first,
    /// plus the total number of matching records
    async fn query_merged_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<QueryPage, StoreError>;

    /// Row counts per collection
    async fn counts(&self) -> Result<StoreCounts, StoreError>;
}

/// Session upsert payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub session_id: String,
    pub device_id: String,
    /// Raw sensor names seen in the batch
    pub sensor_names: Vec<String>,
    /// Raw readings in the batch
    pub points: u64,
    pub seen_at: DateTime<Utc>,
}

/// Persisted device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub device_id: String,
    pub device_name: String,
    pub platform: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl DeviceRecord {
    /// Placeholder device, as created on first contact
    pub fn first_contact(device_id: &str, seen_at: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.to_string(),
            device_name: format!("Device {device_id}"),
            platform: "Unknown".to_string(),
            first_seen: seen_at,
            last_seen: seen_at,
        }
    }
}

/// Persisted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub device_id: String,
    pub start_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    /// Raw sensor names ever seen, sorted
    pub sensor_types: Vec<String>,
    pub total_data_points: u64,
}

impl SessionRecord {
    /// Session as created by its first batch
    pub fn start(update: &SessionUpdate) -> Self {
        let mut sensor_types = update.sensor_names.clone();
        sensor_types.sort();
        sensor_types.dedup();
        Self {
            session_id: update.session_id.clone(),
            device_id: update.device_id.clone(),
            start_time: update.seen_at,
            updated_at: update.seen_at,
            is_active: true,
            sensor_types,
            total_data_points: update.points,
        }
    }

    /// Fold a later batch into the session
    pub fn absorb(&mut self, update: &SessionUpdate) {
        self.is_active = true;
        self.updated_at = update.seen_at;
        self.total_data_points += update.points;
        for name in &update.sensor_names {
            if let Err(pos) = self.sensor_types.binary_search(name) {
                self.sensor_types.insert(pos, name.clone());
            }
        }
    }
}

/// Read filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    pub session_id: Option<String>,
    pub device_id: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, origin: &BatchOrigin) -> bool {
        self.session_id
            .as_deref()
            .is_none_or(|s| s == origin.session_id)
            && self
                .device_id
                .as_deref()
                .is_none_or(|d| d == origin.device_id)
    }

    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.device_id.is_none()
    }
}

/// Query result page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    /// Oldest first
    pub records: Vec<MergedRecord>,
    /// Matching records in the store, not just this page
    pub total: usize,
}

/// Collection sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub devices: u64,
    pub sessions: u64,
    pub raw_readings: u64,
    pub merged_records: u64,
}

/// Where a read was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Durable store
    #[serde(rename = "database")]
    Store,
    /// In-memory fallback buffer
    #[serde(rename = "memory")]
    Memory,
}

impl Provenance {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "database",
            Self::Memory => "memory",
        }
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

    #[test]
    fn test_filter_matches() {
        let any = RecordFilter::default();
        assert!(any.matches(&origin("s1", "d1")));

        let by_session = RecordFilter {
            session_id: Some("s1".into()),
            device_id: None,
        };
        assert!(by_session.matches(&origin("s1", "d2")));
        assert!(!by_session.matches(&origin("s2", "d2")));

        let both = RecordFilter {
            session_id: Some("s1".into()),
            device_id: Some("d1".into()),
        };
        assert!(both.matches(&origin("s1", "d1")));
        assert!(!both.matches(&origin("s1", "d2")));
    }

    #[test]
    fn test_session_absorb_accumulates() {
        let t0 = DateTime::from_timestamp_millis(0).unwrap();
        let t1 = DateTime::from_timestamp_millis(10).unwrap();
        let mut session = SessionRecord::start(&SessionUpdate {
            session_id: "s".into(),
            device_id: "d".into(),
            sensor_names: vec!["gyroscope".into(), "accelerometer".into()],
            points: 4,
            seen_at: t0,
        });
        session.absorb(&SessionUpdate {
            session_id: "s".into(),
            device_id: "d".into(),
            sensor_names: vec!["gps".into(), "gyroscope".into()],
            points: 3,
            seen_at: t1,
        });

        assert_eq!(session.total_data_points, 7);
        assert_eq!(session.start_time, t0);
        assert_eq!(session.updated_at, t1);
        assert_eq!(session.sensor_types, ["accelerometer", "gps", "gyroscope"]);
    }

    #[test]
    fn test_provenance_wire_names() {
        assert_eq!(
            serde_json::to_string(&Provenance::Store).unwrap(),
            "\"database\""
        );
        assert_eq!(
            serde_json::to_string(&Provenance::Memory).unwrap(),
            "\"memory\""
        );
    }
}
