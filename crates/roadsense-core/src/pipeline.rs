use roadsense_parser::{AccelerometerSample, AggregatedFrame};

use crate::classifier::classify;
use crate::record::ProcessedRecord;

pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Per-stream classification and batching state.
///
/// One instance per logical sensor stream: the previous-sample slot and the
/// batch buffer are owned here, never shared. Concurrent streams each own
/// their own pipeline; nothing in this type is process-wide.
#[derive(Debug)]
pub struct StreamPipeline {
    previous: Option<AccelerometerSample>,
    batch: Vec<ProcessedRecord>,
    batch_size: usize,
}

impl StreamPipeline {
    pub fn new(batch_size: usize) -> Self {
        Self {
            previous: None,
            batch: Vec::with_capacity(batch_size.max(1)),
            batch_size: batch_size.max(1),
        }
    }

    /// Classifies one frame against its predecessor and buffers the result.
    ///
    /// Returns the full batch once the flush threshold is reached. The
    /// previous-sample slot advances unconditionally: classification depends
    /// on raw sensor continuity, not on what downstream does with the
    /// records.
    pub fn process(&mut self, frame: AggregatedFrame) -> Option<Vec<ProcessedRecord>> {
        let state = classify(self.previous.as_ref(), &frame.accelerometer);
        let record = ProcessedRecord::new(state, &frame);
        self.previous = Some(frame.accelerometer);
        self.batch.push(record);

        if self.batch.len() >= self.batch_size {
            Some(std::mem::take(&mut self.batch))
        } else {
            None
        }
    }

    /// Takes whatever is buffered. Called at session end so a partial batch
    /// is flushed rather than discarded.
    pub fn drain(&mut self) -> Vec<ProcessedRecord> {
        std::mem::take(&mut self.batch)
    }

    pub fn buffered(&self) -> usize {
        self.batch.len()
    }
}

impl Default for StreamPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roadsense_parser::{AccelerometerSample, AggregatedFrame, GpsSample, ParkingSample};

    use super::*;
    use crate::record::RoadState;

    fn frame(z: f64) -> AggregatedFrame {
        AggregatedFrame {
            accelerometer: AccelerometerSample::new(0.0, 0.0, z),
            gps: GpsSample::new(50.0, 30.0),
            parking: ParkingSample::new(5, GpsSample::new(50.0, 30.0)),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn classifies_against_immediate_predecessor() {
        let mut pipeline = StreamPipeline::new(10);
        for z in [0.0, 0.05, 0.5, 2.0] {
            assert!(pipeline.process(frame(z)).is_none());
        }

        let states: Vec<RoadState> = pipeline
            .drain()
            .into_iter()
            .map(|record| record.road_state)
            .collect();
        assert_eq!(
            states,
            vec![
                RoadState::Start,
                RoadState::Smooth,
                RoadState::Normal,
                RoadState::Rough
            ]
        );
    }

    #[test]
    fn slot_advances_even_when_batch_is_handed_off() {
        let mut pipeline = StreamPipeline::new(1);

        let first = pipeline.process(frame(0.0)).expect("batch of one");
        assert_eq!(first[0].road_state, RoadState::Start);

        // The predecessor is the frame just processed, not the batch state.
        let second = pipeline.process(frame(0.5)).expect("batch of one");
        assert_eq!(second[0].road_state, RoadState::Normal);
    }

    #[test]
    fn batch_is_returned_exactly_at_threshold() {
        let mut pipeline = StreamPipeline::new(3);
        assert!(pipeline.process(frame(0.0)).is_none());
        assert!(pipeline.process(frame(0.0)).is_none());

        let batch = pipeline.process(frame(0.0)).expect("full batch");
        assert_eq!(batch.len(), 3);
        assert_eq!(pipeline.buffered(), 0);
    }

    #[test]
    fn drain_takes_the_partial_batch() {
        let mut pipeline = StreamPipeline::new(10);
        pipeline.process(frame(0.0));
        pipeline.process(frame(0.2));

        let remainder = pipeline.drain();
        assert_eq!(remainder.len(), 2);
        assert!(pipeline.drain().is_empty());
    }

    #[test]
    fn zero_batch_size_is_clamped_to_one() {
        let mut pipeline = StreamPipeline::new(0);
        assert!(pipeline.process(frame(0.0)).is_some());
    }
}
