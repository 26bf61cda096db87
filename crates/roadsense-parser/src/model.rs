use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw accelerometer axes at one tick.
///
/// The axes are floats rather than the integers the origin files carry:
/// classification compares fractional vertical deltas, and the store schema
/// types all three axes as floats. The wire parser accepts both integer and
/// float literals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerometerSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Empty-slot count plus the location of the parking sensor reading.
///
/// The wire row is `count,lat,lon` — three distinct fields. The origin's
/// reader reused the count field as the first GPS coordinate; that aliasing
/// is treated as a defect in the origin format and is not reproduced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParkingSample {
    pub empty_count: i64,
    pub location: GpsSample,
}

impl ParkingSample {
    pub fn new(empty_count: i64, location: GpsSample) -> Self {
        Self {
            empty_count,
            location,
        }
    }
}

/// One correlated set of sensor readings captured at a single tick.
///
/// Immutable after construction; stamped with wall-clock capture time by
/// the frame reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFrame {
    pub accelerometer: AccelerometerSample,
    pub gps: GpsSample,
    pub parking: ParkingSample,
    pub timestamp: DateTime<Utc>,
}
