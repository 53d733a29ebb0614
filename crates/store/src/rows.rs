//! Persisted row shapes

use chrono::{DateTime, Utc};
use contracts::{BatchOrigin, MergedRecord, RawReading};
use serde::{Deserialize, Serialize};

/// Raw reading as stored, verbatim plus its batch origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReading {
    #[serde(flatten)]
    pub origin: BatchOrigin,
    #[serde(flatten)]
    pub reading: RawReading,
    pub received_at: DateTime<Utc>,
}

impl StoredReading {
    pub fn new(origin: &BatchOrigin, reading: &RawReading, received_at: DateTime<Utc>) -> Self {
        Self {
            origin: origin.clone(),
            reading: reading.clone(),
            received_at,
        }
    }
}

/// Merged record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(flatten)]
    pub origin: BatchOrigin,
    #[serde(flatten)]
    pub record: MergedRecord,
}

impl StoredRecord {
    pub fn new(origin: &BatchOrigin, record: &MergedRecord) -> Self {
        Self {
            origin: origin.clone(),
            record: record.clone(),
        }
    }
}
