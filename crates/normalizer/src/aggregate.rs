//! Time-group aggregator
//!
//! Groups a batch of readings by exact `time` into one merged record per
//! distinct value, emitted in first-seen order.

use std::collections::{BTreeSet, HashMap};

use contracts::{MergedRecord, RawReading};
use tracing::{debug, instrument};

use crate::normalize::normalize;

/// Reading whose name matched no alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedReading {
    pub name: String,
    pub time: i64,
}

/// Aggregator output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One record per distinct `time`, first-seen order
    pub records: Vec<MergedRecord>,
    /// Readings dropped from canonical output, in input order
    pub unrecognized: Vec<UnrecognizedReading>,
    /// Distinct raw sensor names in the batch, sorted
    pub sensor_names: Vec<String>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Aggregate a batch of readings.
///
/// Readings sharing a `time` merge into one record; a repeated kind at the same
/// `time` replaces the earlier fragment wholesale. Unrecognized names still
/// create the timestamp's record but contribute no fragment.
///
/// # Example
///
/// ```
/// use contracts::{RawReading, ReadingValues};
/// use normalizer::aggregate;
///
/// let xyz: ReadingValues = [("x", 1.0), ("y", 2.0), ("z", 3.0)].into_iter().collect();
/// let readings = [
///     RawReading::new("accelerometer", 1_000_000_000, xyz.clone()),
///     RawReading::new("Gyroscope", 1_000_000_000, xyz),
///     RawReading::new("thermometer", 2_000_000_000, ReadingValues::new()),
/// ];
///
/// let aggregation = aggregate(&readings);
/// assert_eq!(aggregation.records.len(), 2);
/// assert_eq!(aggregation.records[0].timestamp_millis(), 1000);
/// assert!(aggregation.records[0].gyroscope.is_some());
/// assert!(aggregation.records[1].kinds().is_empty());
/// assert_eq!(aggregation.unrecognized[0].name, "thermometer");
/// ```
#[instrument(name = "aggregate", skip(readings), fields(readings = readings.len()))]
pub fn aggregate(readings: &[RawReading]) -> Aggregation {
    let mut slots: HashMap<i64, usize> = HashMap::with_capacity(readings.len());
    let mut records: Vec<MergedRecord> = Vec::new();
    let mut unrecognized = Vec::new();
    let mut names = BTreeSet::new();

    for reading in readings {
        names.insert(reading.name.as_str());

        let slot = *slots.entry(reading.time).or_insert_with(|| {
            records.push(MergedRecord::at_nanos(reading.time));
            records.len() - 1
        });

        match normalize(reading) {
            Some(fragment) => records[slot].apply(fragment),
            None => {
                debug!(name = %reading.name, time = reading.time, "Unrecognized sensor");
                unrecognized.push(UnrecognizedReading {
                    name: reading.name.clone(),
                    time: reading.time,
                });
            }
        }
    }

    debug!(
        records = records.len(),
        unrecognized = unrecognized.len(),
        "Batch aggregated"
    );

    Aggregation {
        records,
        unrecognized,
        sensor_names: names.into_iter().map(str::to_string).collect(),
    }
}
