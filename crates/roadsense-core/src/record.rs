use chrono::{DateTime, Utc};
use roadsense_parser::{AccelerometerSample, AggregatedFrame, GpsSample};
use serde::{Deserialize, Serialize};

/// Discrete road-roughness classification derived from consecutive
/// vertical-acceleration deltas.
///
/// `Start` is the sentinel for "no prior frame exists yet" — a valid
/// first-class label, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadState {
    Start,
    Smooth,
    Normal,
    Rough,
}

impl RoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadState::Start => "start",
            RoadState::Smooth => "smooth",
            RoadState::Normal => "normal",
            RoadState::Rough => "rough",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "smooth" => Some(Self::Smooth),
            "normal" => Some(Self::Normal),
            "rough" => Some(Self::Rough),
            _ => None,
        }
    }
}

impl From<RoadState> for String {
    fn from(value: RoadState) -> Self {
        value.as_str().to_string()
    }
}

/// One classified reading, in the shape the store accepts: road state plus
/// the accelerometer, GPS, and capture timestamp of the frame it came from.
///
/// Parking occupancy is aggregated per frame but not persisted. Immutable
/// once produced; ownership transfers to the batch, then to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub road_state: RoadState,
    pub accelerometer: AccelerometerSample,
    pub gps: GpsSample,
    pub timestamp: DateTime<Utc>,
}

impl ProcessedRecord {
    pub fn new(road_state: RoadState, frame: &AggregatedFrame) -> Self {
        Self {
            road_state,
            accelerometer: frame.accelerometer,
            gps: frame.gps,
            timestamp: frame.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn road_state_round_trips_through_strings() {
        for state in [
            RoadState::Start,
            RoadState::Smooth,
            RoadState::Normal,
            RoadState::Rough,
        ] {
            assert_eq!(RoadState::from_str(state.as_str()), Some(state));
        }
        assert_eq!(RoadState::from_str("bumpy"), None);
    }

    #[test]
    fn road_state_serializes_snake_case() {
        let json = serde_json::to_string(&RoadState::Rough).expect("serialize");
        assert_eq!(json, "\"rough\"");
    }
}
