//! Sensor alias table
//!
//! Raw logger names (any case, known synonyms) to canonical kinds.

use std::collections::HashMap;
use std::sync::LazyLock;

use contracts::SensorKind;

/// Accepted spellings, lowercase
const ALIASES: &[(&str, SensorKind)] = &[
    ("accelerometer", SensorKind::Accelerometer),
    ("gyroscope", SensorKind::Gyroscope),
    ("gravity", SensorKind::Gravity),
    ("orientation", SensorKind::Orientation),
    ("wrist motion", SensorKind::WristMotion),
    ("wristmotion", SensorKind::WristMotion),
    ("magnetometer", SensorKind::Magnetometer),
    ("compass", SensorKind::Compass),
    ("microphone", SensorKind::Microphone),
    ("heart rate", SensorKind::HeartRate),
    ("heartrate", SensorKind::HeartRate),
    ("motion", SensorKind::WatchMotion),
    ("location", SensorKind::Location),
    ("gps", SensorKind::Location),
    ("barometer", SensorKind::Barometer),
    ("pressure", SensorKind::Barometer),
    ("accelerometeruncalibrated", SensorKind::AccelerometerUncalibrated),
    ("gyroscopeuncalibrated", SensorKind::GyroscopeUncalibrated),
    ("magnetometeruncalibrated", SensorKind::MagnetometerUncalibrated),
];

static ALIAS_MAP: LazyLock<HashMap<&'static str, SensorKind>> =
    LazyLock::new(|| ALIASES.iter().copied().collect());

/// Resolve a raw sensor name to its canonical kind.
///
/// Case-insensitive exact match; surrounding whitespace is significant.
pub fn resolve_kind(name: &str) -> Option<SensorKind> {
    ALIAS_MAP.get(name.to_lowercase().as_str()).copied()
}

/// Every accepted alias with its kind
pub fn aliases() -> &'static [(&'static str, SensorKind)] {
    ALIASES
}
