//! MergedRecord - Aggregator output
//!
//! One normalized record per distinct reading timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BarometerValues, BearingValues, HeartRateValues, LocationValues, MicrophoneValues,
    OrientationValues, SensorKind, Vector3, WatchMotionValues, WristMotionValues,
};

/// Nanoseconds per millisecond
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Convert a reading `time` (ns) to a millisecond-resolution instant.
///
/// Sub-millisecond digits are truncated toward zero.
pub fn timestamp_from_nanos(nanos: i64) -> DateTime<Utc> {
    // i64 nanoseconds always fit chrono's range once reduced to milliseconds.
    DateTime::from_timestamp_millis(nanos / NANOS_PER_MILLI).unwrap_or_default()
}

/// Normalized fragment produced from one reading.
///
/// The variant identifies the canonical kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fragment {
    Accelerometer(Vector3),
    Gyroscope(Vector3),
    Gravity(Vector3),
    Orientation(OrientationValues),
    WristMotion(WristMotionValues),
    Magnetometer(BearingValues),
    Compass(BearingValues),
    Microphone(MicrophoneValues),
    HeartRate(HeartRateValues),
    WatchMotion(WatchMotionValues),
    Location(LocationValues),
    Barometer(BarometerValues),
    AccelerometerUncalibrated(Vector3),
    GyroscopeUncalibrated(Vector3),
    MagnetometerUncalibrated(Vector3),
}

impl Fragment {
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Accelerometer(_) => SensorKind::Accelerometer,
            Self::Gyroscope(_) => SensorKind::Gyroscope,
            Self::Gravity(_) => SensorKind::Gravity,
            Self::Orientation(_) => SensorKind::Orientation,
            Self::WristMotion(_) => SensorKind::WristMotion,
            Self::Magnetometer(_) => SensorKind::Magnetometer,
            Self::Compass(_) => SensorKind::Compass,
            Self::Microphone(_) => SensorKind::Microphone,
            Self::HeartRate(_) => SensorKind::HeartRate,
            Self::WatchMotion(_) => SensorKind::WatchMotion,
            Self::Location(_) => SensorKind::Location,
            Self::Barometer(_) => SensorKind::Barometer,
            Self::AccelerometerUncalibrated(_) => SensorKind::AccelerometerUncalibrated,
            Self::GyroscopeUncalibrated(_) => SensorKind::GyroscopeUncalibrated,
            Self::MagnetometerUncalibrated(_) => SensorKind::MagnetometerUncalibrated,
        }
    }
}

/// Merged record
///
/// A kind is `Some` only when a reading of that kind shared this timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    /// Millisecond-resolution instant derived from the reading time
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerometer: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyroscope: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrist_motion: Option<WristMotionValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetometer: Option<BearingValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compass: Option<BearingValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microphone: Option<MicrophoneValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_motion: Option<WatchMotionValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barometer: Option<BarometerValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerometer_uncalibrated: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gyroscope_uncalibrated: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetometer_uncalibrated: Option<Vector3>,
}

impl MergedRecord {
    /// Timestamp-only record
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            accelerometer: None,
            gyroscope: None,
            gravity: None,
            orientation: None,
            wrist_motion: None,
            magnetometer: None,
            compass: None,
            microphone: None,
            heart_rate: None,
            watch_motion: None,
            location: None,
            barometer: None,
            accelerometer_uncalibrated: None,
            gyroscope_uncalibrated: None,
            magnetometer_uncalibrated: None,
        }
    }

    /// Timestamp-only record for a reading time in nanoseconds
    pub fn at_nanos(nanos: i64) -> Self {
        Self::new(timestamp_from_nanos(nanos))
    }

    /// Set the fragment's kind, replacing any earlier value wholesale
    pub fn apply(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Accelerometer(v) => self.accelerometer = Some(v),
            Fragment::Gyroscope(v) => self.gyroscope = Some(v),
            Fragment::Gravity(v) => self.gravity = Some(v),
            Fragment::Orientation(v) => self.orientation = Some(v),
            Fragment::WristMotion(v) => self.wrist_motion = Some(v),
            Fragment::Magnetometer(v) => self.magnetometer = Some(v),
            Fragment::Compass(v) => self.compass = Some(v),
            Fragment::Microphone(v) => self.microphone = Some(v),
            Fragment::HeartRate(v) => self.heart_rate = Some(v),
            Fragment::WatchMotion(v) => self.watch_motion = Some(v),
            Fragment::Location(v) => self.location = Some(v),
            Fragment::Barometer(v) => self.barometer = Some(v),
            Fragment::AccelerometerUncalibrated(v) => self.accelerometer_uncalibrated = Some(v),
            Fragment::GyroscopeUncalibrated(v) => self.gyroscope_uncalibrated = Some(v),
            Fragment::MagnetometerUncalibrated(v) => self.magnetometer_uncalibrated = Some(v),
        }
    }

    /// Whether a fragment of `kind` is present
    pub fn has(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Accelerometer => self.accelerometer.is_some(),
            SensorKind::Gyroscope => self.gyroscope.is_some(),
            SensorKind::Gravity => self.gravity.is_some(),
            SensorKind::Orientation => self.orientation.is_some(),
            SensorKind::WristMotion => self.wrist_motion.is_some(),
            SensorKind::Magnetometer => self.magnetometer.is_some(),
            SensorKind::Compass => self.compass.is_some(),
            SensorKind::Microphone => self.microphone.is_some(),
            SensorKind::HeartRate => self.heart_rate.is_some(),
            SensorKind::WatchMotion => self.watch_motion.is_some(),
            SensorKind::Location => self.location.is_some(),
            SensorKind::Barometer => self.barometer.is_some(),
            SensorKind::AccelerometerUncalibrated => self.accelerometer_uncalibrated.is_some(),
            SensorKind::GyroscopeUncalibrated => self.gyroscope_uncalibrated.is_some(),
            SensorKind::MagnetometerUncalibrated => self.magnetometer_uncalibrated.is_some(),
        }
    }

    /// Kinds present, in field order
    pub fn kinds(&self) -> Vec<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }

    /// Milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
