//! Reading normalizer
//!
//! One raw reading to one typed fragment. Never fails: unknown names yield
//! `None`, missing or non-numeric fields default to 0, and a zero under a
//! preferred key defers to the next key in the field's source list.

use contracts::{
    BarometerValues, BearingValues, Fragment, HeartRateValues, LocationValues, MicrophoneValues,
    OrientationValues, RawReading, ReadingValues, SensorKind, Vector3, WatchMotionValues,
    WristMotionValues,
};

use crate::alias::resolve_kind;

/// Normalize a reading, or `None` when its name is not recognized
///
/// # Example
///
/// ```
/// use contracts::{Fragment, RawReading};
///
/// let reading = RawReading::new(
///     "Heart Rate",
///     0,
///     [("bpm", 0.0), ("heartRate", 72.0)].into_iter().collect(),
/// );
/// match normalizer::normalize(&reading) {
///     Some(Fragment::HeartRate(hr)) => assert_eq!(hr.bpm, 72.0),
///     other => panic!("unexpected fragment: {other:?}"),
/// }
/// ```
pub fn normalize(reading: &RawReading) -> Option<Fragment> {
    resolve_kind(&reading.name).map(|kind| normalize_as(kind, &reading.values))
}

/// Build the fragment for a known kind from a raw payload
pub fn normalize_as(kind: SensorKind, values: &ReadingValues) -> Fragment {
    match kind {
        SensorKind::Accelerometer => Fragment::Accelerometer(Vector3::resolve(values)),
        SensorKind::Gyroscope => Fragment::Gyroscope(Vector3::resolve(values)),
        SensorKind::Gravity => Fragment::Gravity(Vector3::resolve(values)),
        SensorKind::Orientation => Fragment::Orientation(OrientationValues::resolve(values)),
        SensorKind::WristMotion => Fragment::WristMotion(WristMotionValues::resolve(values)),
        SensorKind::Magnetometer => Fragment::Magnetometer(BearingValues::resolve(values)),
        SensorKind::Compass => Fragment::Compass(BearingValues::resolve(values)),
        SensorKind::Microphone => Fragment::Microphone(MicrophoneValues::resolve(values)),
        SensorKind::HeartRate => Fragment::HeartRate(HeartRateValues::resolve(values)),
        SensorKind::WatchMotion => Fragment::WatchMotion(WatchMotionValues::resolve(values)),
        SensorKind::Location => Fragment::Location(LocationValues::resolve(values)),
        SensorKind::Barometer => Fragment::Barometer(BarometerValues::resolve(values)),
        SensorKind::AccelerometerUncalibrated => {
            Fragment::AccelerometerUncalibrated(Vector3::resolve(values))
        }
        SensorKind::GyroscopeUncalibrated => {
            Fragment::GyroscopeUncalibrated(Vector3::resolve(values))
        }
        SensorKind::MagnetometerUncalibrated => {
            Fragment::MagnetometerUncalibrated(Vector3::resolve(values))
        }
    }
}
