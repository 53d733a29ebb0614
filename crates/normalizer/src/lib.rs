//! # Normalizer
//!
//! Sensor normalization and time-alignment engine.
//!
//! - `alias`: raw sensor name to [`SensorKind`](contracts::SensorKind)
//! - `normalize`: one raw reading to a typed fragment
//! - `aggregate`: a batch of readings to one merged record per timestamp
//!
//! Everything here is pure and lock-free; callers decide where the output goes.

pub mod aggregate;
pub mod alias;
pub mod normalize;

pub use aggregate::{aggregate, Aggregation, UnrecognizedReading};
pub use alias::resolve_kind;
pub use normalize::{normalize, normalize_as};
