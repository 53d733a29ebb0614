//! Error types shared across the hub
//!
//! `ContractError` covers config and ingest input; `StoreError` covers persistence.

use thiserror::Error;

/// Config or input failure
#[derive(Debug, Error)]
pub enum ContractError {
    /// The config document could not be decoded
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A decoded config value is out of range
    #[error("invalid config value '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// The request body is not a batch
    #[error("malformed batch: {message}")]
    MalformedBatch { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed_batch(message: impl Into<String>) -> Self {
        Self::MalformedBatch {
            message: message.into(),
        }
    }
}

/// Durable store failure.
///
/// Every store operation fails independently; callers degrade instead of aborting.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend is not reachable or disabled
    #[error("store '{store}' unavailable: {message}")]
    Unavailable { store: String, message: String },

    /// A write was rejected
    #[error("store '{store}' write error during {operation}: {message}")]
    Write {
        store: String,
        operation: &'static str,
        message: String,
    },

    /// A query was rejected
    #[error("store '{store}' query error: {message}")]
    Query { store: String, message: String },

    /// IO error
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized
    #[error("store codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            store: store.into(),
            message: message.into(),
        }
    }

    pub fn write(
        store: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Write {
            store: store.into(),
            operation,
            message: message.into(),
        }
    }

    pub fn query(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            store: store.into(),
            message: message.into(),
        }
    }
}
