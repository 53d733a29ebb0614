//! SensorKind - closed enumeration of canonical sensor categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical sensor kind.
///
/// Serialized with the dashboard field names (`heartRate`, `wristMotion`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Gravity,
    Orientation,
    WristMotion,
    Magnetometer,
    Compass,
    Microphone,
    HeartRate,
    WatchMotion,
    Location,
    Barometer,
    AccelerometerUncalibrated,
    GyroscopeUncalibrated,
    MagnetometerUncalibrated,
}

impl SensorKind {
    /// Every kind, in record field order
    pub const ALL: [SensorKind; 15] = [
        Self::Accelerometer,
        Self::Gyroscope,
        Self::Gravity,
        Self::Orientation,
        Self::WristMotion,
        Self::Magnetometer,
        Self::Compass,
        Self::Microphone,
        Self::HeartRate,
        Self::WatchMotion,
        Self::Location,
        Self::Barometer,
        Self::AccelerometerUncalibrated,
        Self::GyroscopeUncalibrated,
        Self::MagnetometerUncalibrated,
    ];

    /// Record field name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::Gyroscope => "gyroscope",
            Self::Gravity => "gravity",
            Self::Orientation => "orientation",
            Self::WristMotion => "wristMotion",
            Self::Magnetometer => "magnetometer",
            Self::Compass => "compass",
            Self::Microphone => "microphone",
            Self::HeartRate => "heartRate",
            Self::WatchMotion => "watchMotion",
            Self::Location => "location",
            Self::Barometer => "barometer",
            Self::AccelerometerUncalibrated => "accelerometerUncalibrated",
            Self::GyroscopeUncalibrated => "gyroscopeUncalibrated",
            Self::MagnetometerUncalibrated => "magnetometerUncalibrated",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
