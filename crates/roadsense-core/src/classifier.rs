use roadsense_parser::AccelerometerSample;

use crate::record::RoadState;

/// Vertical deltas below this are a smooth surface.
pub const SMOOTH_THRESHOLD: f64 = 0.1;
/// Vertical deltas at or above this are a rough surface.
pub const ROUGH_THRESHOLD: f64 = 1.0;

/// Classifies road roughness from two consecutive accelerometer samples.
///
/// Pure function of its inputs; the caller threads the previous sample
/// across ticks. Only the vertical axis matters — for a fixed sensor mount,
/// vertical acceleration correlates with surface roughness while x/y mostly
/// track vehicle motion.
///
/// The bands are half-open, boundary values belong to the lower band:
/// `[0, 0.1)` smooth, `[0.1, 1.0)` normal, `[1.0, ∞)` rough. With no
/// previous sample the result is [`RoadState::Start`].
pub fn classify(prev: Option<&AccelerometerSample>, curr: &AccelerometerSample) -> RoadState {
    let Some(prev) = prev else {
        return RoadState::Start;
    };

    let diff = (curr.z - prev.z).abs();
    if diff < SMOOTH_THRESHOLD {
        RoadState::Smooth
    } else if diff < ROUGH_THRESHOLD {
        RoadState::Normal
    } else {
        RoadState::Rough
    }
}
