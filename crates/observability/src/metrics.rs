//! Ingest metrics
//!
//! Prometheus-facing helpers plus an in-process aggregator backing the
//! status endpoint.

use std::collections::BTreeMap;

use contracts::{MergedRecord, SensorKind};
use metrics::{counter, gauge, histogram};
use serde::Serialize;

/// What one accepted ingest call did
#[derive(Debug, Clone, Copy)]
pub struct IngestSample<'a> {
    /// Raw readings in the batch
    pub readings: usize,
    /// Merged records produced
    pub records: &'a [MergedRecord],
    /// Names of readings that matched no alias
    pub unrecognized: &'a [String],
    /// Store operations that failed
    pub storage_errors: usize,
    /// Wall time spent handling the batch
    pub latency_ms: f64,
}

/// Record an accepted batch.
///
/// Unrecognized readings carry no name label; per-name counts live in
/// [`IngestStatsAggregator`].
pub fn record_ingest(sample: &IngestSample<'_>) {
    counter!("sensor_hub_batches_total").increment(1);
    counter!("sensor_hub_readings_total").increment(sample.readings as u64);
    counter!("sensor_hub_records_total").increment(sample.records.len() as u64);

    if !sample.unrecognized.is_empty() {
        counter!("sensor_hub_unrecognized_readings_total")
            .increment(sample.unrecognized.len() as u64);
    }
    if sample.storage_errors > 0 {
        counter!("sensor_hub_partial_persist_total").increment(1);
    }

    for record in sample.records {
        for kind in record.kinds() {
            counter!("sensor_hub_fragments_total", "kind" => kind.as_str()).increment(1);
        }
    }

    histogram!("sensor_hub_ingest_latency_ms").record(sample.latency_ms);
}

/// Record a rejected batch
pub fn record_batch_rejected(error: &'static str) {
    counter!("sensor_hub_batches_rejected_total", "error" => error).increment(1);
}

/// Record buffer occupancy after an append
pub fn record_buffer(len: usize, capacity: usize, evicted: usize) {
    gauge!("sensor_hub_buffer_len").set(len as f64);
    gauge!("sensor_hub_buffer_capacity").set(capacity as f64);
    if evicted > 0 {
        counter!("sensor_hub_buffer_evictions_total").increment(evicted as u64);
    }
}

/// Record one store operation outcome
pub fn record_store_op(operation: &'static str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "sensor_hub_store_ops_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

/// Record a served read
pub fn record_read(source: &'static str, returned: usize) {
    counter!("sensor_hub_reads_total", "source" => source).increment(1);
    histogram!("sensor_hub_read_records").record(returned as f64);
}

/// Ingest statistics aggregator
///
/// Aggregates in memory for the status endpoint and the shutdown summary.
#[derive(Debug, Clone, Default)]
pub struct IngestStatsAggregator {
    pub total_batches: u64,
    pub rejected_batches: u64,
    pub total_readings: u64,
    pub total_records: u64,
    pub total_unrecognized: u64,
    /// Batches where at least one store operation failed
    pub partial_persists: u64,

    pub latency_stats: RunningStats,
    pub readings_per_batch: RunningStats,

    /// Records carrying each kind
    pub kind_counts: BTreeMap<SensorKind, u64>,
    /// Unrecognized readings per raw name
    pub unrecognized_counts: BTreeMap<String, u64>,
}

impl IngestStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: &IngestSample<'_>) {
        self.total_batches += 1;
        self.total_readings += sample.readings as u64;
        self.total_records += sample.records.len() as u64;
        self.total_unrecognized += sample.unrecognized.len() as u64;
        if sample.storage_errors > 0 {
            self.partial_persists += 1;
        }

        self.latency_stats.push(sample.latency_ms);
        self.readings_per_batch.push(sample.readings as f64);

        for record in sample.records {
            for kind in record.kinds() {
                *self.kind_counts.entry(kind).or_insert(0) += 1;
            }
        }
        for name in sample.unrecognized {
            *self.unrecognized_counts.entry(name.clone()).or_insert(0) += 1;
        }
    }

    pub fn record_rejected(&mut self) {
        self.rejected_batches += 1;
    }

    pub fn summary(&self) -> IngestSummary {
        IngestSummary {
            total_batches: self.total_batches,
            rejected_batches: self.rejected_batches,
            total_readings: self.total_readings,
            total_records: self.total_records,
            total_unrecognized: self.total_unrecognized,
            partial_persists: self.partial_persists,
            unrecognized_rate: if self.total_readings > 0 {
                self.total_unrecognized as f64 / self.total_readings as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            readings_per_batch: StatsSummary::from(&self.readings_per_batch),
            kind_counts: self
                .kind_counts
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), *count))
                .collect(),
            unrecognized_counts: self.unrecognized_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Ingest summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub total_batches: u64,
    pub rejected_batches: u64,
    pub total_readings: u64,
    pub total_records: u64,
    pub total_unrecognized: u64,
    pub partial_persists: u64,
    /// Percent of readings that were unrecognized
    pub unrecognized_rate: f64,
    pub latency_ms: StatsSummary,
    pub readings_per_batch: StatsSummary,
    pub kind_counts: BTreeMap<String, u64>,
    pub unrecognized_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Ingest Summary ===")?;
        writeln!(
            f,
            "Batches: {} accepted, {} rejected",
            self.total_batches, self.rejected_batches
        )?;
        writeln!(f, "Readings: {}", self.total_readings)?;
        writeln!(f, "Merged records: {}", self.total_records)?;
        writeln!(
            f,
            "Unrecognized readings: {} ({:.2}%)",
            self.total_unrecognized, self.unrecognized_rate
        )?;
        writeln!(f, "Batches with storage errors: {}", self.partial_persists)?;
        writeln!(f, "Ingest latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Readings per batch: {}", self.readings_per_batch)?;

        if !self.unrecognized_counts.is_empty() {
            writeln!(f, "Unrecognized sensor names:")?;
            for (name, count) in &self.unrecognized_counts {
                writeln!(f, "  {name:?}: {count}")?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
