//! RawReading / RawBatch - ingest input
//!
//! Wire shapes posted by mobile loggers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ContractError;

/// One batch posted by a logger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBatch {
    /// Logger-assigned message counter
    pub message_id: i64,

    /// Recording session
    pub session_id: String,

    /// Originating device
    pub device_id: String,

    /// Readings in arrival order; may mix kinds and timestamps
    #[serde(default)]
    pub payload: Vec<RawReading>,
}

impl RawBatch {
    /// Decode a batch from a JSON document.
    ///
    /// # Errors
    /// Returns `ContractError::MalformedBatch` when the document is not a batch,
    /// or when any reading lacks `name` or `time`.
    pub fn from_json(body: &[u8]) -> Result<Self, ContractError> {
        serde_json::from_slice(body).map_err(|e| ContractError::malformed_batch(e.to_string()))
    }

    /// Identifying fields carried alongside stored data
    pub fn origin(&self) -> BatchOrigin {
        BatchOrigin {
            message_id: self.message_id,
            session_id: self.session_id.clone(),
            device_id: self.device_id.clone(),
        }
    }
}

/// A single named sensor sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Free-form sensor name (case-insensitive, may be a synonym)
    pub name: String,

    /// Device-clock timestamp in nanoseconds
    pub time: i64,

    /// Free-form key/value payload
    #[serde(default)]
    pub values: ReadingValues,

    /// Optional logger accuracy hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl RawReading {
    pub fn new(name: impl Into<String>, time: i64, values: ReadingValues) -> Self {
        Self {
            name: name.into(),
            time,
            values,
            accuracy: None,
        }
    }
}

/// Reading payload.
///
/// Kept as the received JSON object so raw storage loses nothing; only
/// numeric entries are visible to the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingValues(Map<String, Value>);

impl ReadingValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric value under `key`, if present and a number
    #[inline]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ReadingValues {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

/// Where a batch came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOrigin {
    pub message_id: i64,
    pub session_id: String,
    pub device_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch() {
        let body = br#"{
            "messageId": 7,
            "sessionId": "s1",
            "deviceId": "d1",
            "payload": [
                {"name": "accelerometer", "time": 1000000000, "values": {"x": 1, "y": 2.5, "z": -3}},
                {"name": "gps", "time": 1000000000, "values": {"lat": 10}, "accuracy": 3}
            ]
        }"#;

        let batch = RawBatch::from_json(body).unwrap();
        assert_eq!(batch.message_id, 7);
        assert_eq!(batch.payload.len(), 2);
        assert_eq!(batch.payload[0].values.number("y"), Some(2.5));
        assert_eq!(batch.payload[1].accuracy, Some(3.0));
        assert_eq!(batch.origin().session_id, "s1");
    }

    #[test]
    fn test_missing_time_is_malformed() {
        let body = br#"{"messageId": 1, "sessionId": "s", "deviceId": "d",
            "payload": [{"name": "gyroscope", "values": {}}]}"#;

        let err = RawBatch::from_json(body).unwrap_err();
        assert!(matches!(err, ContractError::MalformedBatch { .. }));
        assert!(err.to_string().contains("time"));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let body = br#"{"messageId": 1, "sessionId": "s", "deviceId": "d",
            "payload": [{"time": 5}]}"#;

        assert!(RawBatch::from_json(body).is_err());
    }

    #[test]
    fn test_missing_values_defaults_to_empty() {
        let body = br#"{"messageId": 1, "sessionId": "s", "deviceId": "d",
            "payload": [{"name": "microphone", "time": 5}]}"#;

        let batch = RawBatch::from_json(body).unwrap();
        assert!(batch.payload[0].values.is_empty());
    }

    #[test]
    fn test_non_numeric_values_are_retained_but_not_numbers() {
        let body = br#"{"messageId": 1, "sessionId": "s", "deviceId": "d",
            "payload": [{"name": "location", "time": 5, "values": {"lat": "n/a", "lng": 2}}]}"#;

        let batch = RawBatch::from_json(body).unwrap();
        let values = &batch.payload[0].values;
        assert_eq!(values.len(), 2);
        assert_eq!(values.number("lat"), None);
        assert_eq!(values.number("lng"), Some(2.0));
    }
}
