//! Canonical value shapes
//!
//! Each shape carries an explicit field schema: output field name, source keys
//! tried in priority order, and the default used when none of them holds a
//! non-zero number. A `0` under a higher-priority key falls through to the next key.

use serde::{Deserialize, Serialize};

use crate::ReadingValues;

/// One canonical field and where to find it in a raw payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Output field name
    pub name: &'static str,
    /// Source keys, highest priority first
    pub sources: &'static [&'static str],
    /// Value used when no source key holds a non-zero number
    pub default: f64,
}

impl FieldSpec {
    /// First non-zero numeric source value, or the default
    #[inline]
    pub fn resolve(&self, values: &ReadingValues) -> f64 {
        self.sources
            .iter()
            .filter_map(|key| values.number(key))
            .find(|value| *value != 0.0)
            .unwrap_or(self.default)
    }
}

/// Define a canonical value struct together with its field schema.
///
/// Generates:
/// - the struct, with serde names taken from the schema
/// - `SCHEMA`, the ordered field list
/// - `resolve`, which fills every field from a payload
///
/// # Usage
/// ```ignore
/// define_canonical_values!(
///     /// Barometric sample
///     BarometerValues {
///         pressure => "pressure": ["pressure", "hPa"],
///         altitude => "altitude": ["altitude"],
///     }
/// );
/// ```
macro_rules! define_canonical_values {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident => $wire:literal : [$($source:literal),+ $(,)?] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[serde(rename = $wire)]
                pub $field: f64,
            )+
        }

        impl $name {
            /// Field schema in output order
            pub const SCHEMA: &'static [FieldSpec] = &[
                $(
                    FieldSpec {
                        name: $wire,
                        sources: &[$($source),+],
                        default: 0.0,
                    },
                )+
            ];

            /// Fill every field from a raw payload, defaulting missing ones
            pub fn resolve(values: &ReadingValues) -> Self {
                // Struct literal fields evaluate in source order, matching SCHEMA.
                let mut specs = Self::SCHEMA.iter();
                Self {
                    $(
                        $field: specs.next().map_or(0.0, |spec| spec.resolve(values)),
                    )+
                }
            }
        }
    };
}

define_canonical_values!(
    /// Three-axis sample (accelerometer, gyroscope, gravity, uncalibrated variants)
    Vector3 {
        x => "x": ["x"],
        y => "y": ["y"],
        z => "z": ["z"],
    }
);

define_canonical_values!(
    /// Euler angles plus attitude quaternion
    OrientationValues {
        yaw => "yaw": ["yaw"],
        pitch => "pitch": ["pitch"],
        roll => "roll": ["roll"],
        qx => "qx": ["qx"],
        qy => "qy": ["qy"],
        qz => "qz": ["qz"],
        qw => "qw": ["qw"],
    }
);

define_canonical_values!(
    /// Watch wrist motion
    WristMotionValues {
        rotation_rate_x => "rotationRateX": ["rotationRateX"],
        rotation_rate_y => "rotationRateY": ["rotationRateY"],
        rotation_rate_z => "rotationRateZ": ["rotationRateZ"],
        gravity_x => "gravityX": ["gravityX"],
        gravity_y => "gravityY": ["gravityY"],
        gravity_z => "gravityZ": ["gravityZ"],
        acceleration_x => "accelerationX": ["accelerationX"],
        acceleration_y => "accelerationY": ["accelerationY"],
        acceleration_z => "accelerationZ": ["accelerationZ"],
        quaternion_w => "quaternionW": ["quaternionW"],
        quaternion_x => "quaternionX": ["quaternionX"],
        quaternion_y => "quaternionY": ["quaternionY"],
        quaternion_z => "quaternionZ": ["quaternionZ"],
    }
);

define_canonical_values!(
    /// Magnetometer / compass heading
    BearingValues {
        magnetic_bearing => "magneticBearing": ["magneticBearing"],
    }
);

define_canonical_values!(
    /// Microphone level
    MicrophoneValues {
        dbfs => "dBFS": ["dBFS"],
    }
);

define_canonical_values!(
    /// Heart rate
    HeartRateValues {
        bpm => "bpm": ["bpm", "heartRate"],
        confidence => "confidence": ["confidence"],
    }
);

define_canonical_values!(
    /// Watch motion summary
    WatchMotionValues {
        x => "x": ["x"],
        y => "y": ["y"],
        z => "z": ["z"],
        intensity => "intensity": ["intensity"],
    }
);

define_canonical_values!(
    /// GPS fix
    LocationValues {
        latitude => "latitude": ["latitude", "lat"],
        longitude => "longitude": ["longitude", "lng", "lon"],
        altitude => "altitude": ["altitude", "alt"],
        accuracy => "accuracy": ["accuracy"],
        speed => "speed": ["speed"],
        bearing => "bearing": ["bearing"],
    }
);

define_canonical_values!(
    /// Barometric sample
    BarometerValues {
        pressure => "pressure": ["pressure", "hPa"],
        altitude => "altitude": ["altitude"],
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority() {
        let values: ReadingValues = [("lat", 1.0), ("latitude", 2.0)].into_iter().collect();
        let location = LocationValues::resolve(&values);
        assert_eq!(location.latitude, 2.0);
    }

    #[test]
    fn test_fallback_source() {
        let values: ReadingValues = [("lon", 33.0), ("alt", 120.0)].into_iter().collect();
        let location = LocationValues::resolve(&values);
        assert_eq!(location.longitude, 33.0);
        assert_eq!(location.altitude, 120.0);
        assert_eq!(location.latitude, 0.0);
    }

    #[test]
    fn test_zero_in_primary_key_falls_through() {
        let values: ReadingValues = [("bpm", 0.0), ("heartRate", 72.0)].into_iter().collect();
        assert_eq!(HeartRateValues::resolve(&values).bpm, 72.0);

        let values: ReadingValues = [("latitude", 0.0), ("lat", 10.0)].into_iter().collect();
        assert_eq!(LocationValues::resolve(&values).latitude, 10.0);
    }

    #[test]
    fn test_all_zero_sources_give_default() {
        let values: ReadingValues = [("bpm", 0.0), ("heartRate", 0.0)].into_iter().collect();
        assert_eq!(HeartRateValues::resolve(&values).bpm, 0.0);

        let values: ReadingValues = [("x", -0.0), ("y", 0.0)].into_iter().collect();
        let v = Vector3::resolve(&values);
        assert_eq!((v.x, v.y, v.z), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_schema_order_matches_struct() {
        let names: Vec<_> = OrientationValues::SCHEMA.iter().map(|f| f.name).collect();
        assert_eq!(names, ["yaw", "pitch", "roll", "qx", "qy", "qz", "qw"]);

        let values: ReadingValues = [("qw", 1.0), ("yaw", 0.5)].into_iter().collect();
        let orientation = OrientationValues::resolve(&values);
        assert_eq!(orientation.yaw, 0.5);
        assert_eq!(orientation.qw, 1.0);
        assert_eq!(orientation.pitch, 0.0);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(MicrophoneValues { dbfs: -20.0 }).unwrap();
        assert_eq!(json, serde_json::json!({"dBFS": -20.0}));

        let json = serde_json::to_value(WristMotionValues::default()).unwrap();
        assert!(json.get("rotationRateX").is_some());
        assert!(json.get("quaternionW").is_some());
    }
}
