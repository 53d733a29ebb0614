//! API error type
//!
//! Rendered as `{success: false, error, details, timestamp}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use contracts::ContractError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Ingest body is not a valid batch
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Query string could not be decoded
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ApiError {
    /// Stable error kind reported to clients
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::InvalidQuery(_) => "invalid_query",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn details(&self) -> &str {
        match self {
            Self::MalformedInput(details) | Self::InvalidQuery(details) => details,
        }
    }
}

impl From<ContractError> for ApiError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::MalformedBatch { message } => Self::MalformedInput(message),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'static str,
    details: &'a str,
    timestamp: DateTime<Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.kind(),
            details: self.details(),
            timestamp: Utc::now(),
        };
        (self.status(), Json(body)).into_response()
    }
}
