use std::io::Read;
use std::time::Duration;

use roadsense_parser::FrameReader;
use tracing::info;

use crate::error::SessionError;
use crate::pipeline::StreamPipeline;
use crate::sink::{BatchSink, Broadcaster, StoreGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: usize,
    pub batches: usize,
}

/// Drives one sensor stream end to end: read a frame, classify it, deliver
/// full batches, flush the remainder when the stream ends.
///
/// Reads, classification, and buffering are strictly sequential within the
/// session; concurrency across streams means running multiple sessions,
/// each owning its reader and pipeline. The session consumes itself on
/// `run`, so the three sensor sources are released on every exit path.
pub struct SensorSession<R: Read, S, B> {
    reader: FrameReader<R>,
    pipeline: StreamPipeline,
    sink: BatchSink<S, B>,
    tick_interval: Option<Duration>,
}

impl<R: Read, S: StoreGateway, B: Broadcaster> SensorSession<R, S, B> {
    pub fn new(reader: FrameReader<R>, pipeline: StreamPipeline, sink: BatchSink<S, B>) -> Self {
        Self {
            reader,
            pipeline,
            sink,
            tick_interval: None,
        }
    }

    /// Paces live replay by sleeping between ticks.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    /// Runs until the first source is exhausted or a fault occurs.
    ///
    /// End-of-stream drains and delivers the final partial batch — flush,
    /// not discard. Parse and delivery faults propagate after the sensor
    /// sources are dropped.
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        let mut frames = 0usize;
        let mut batches = 0usize;

        loop {
            match self.reader.read_frame() {
                Ok(frame) => {
                    frames += 1;
                    if let Some(batch) = self.pipeline.process(frame) {
                        self.sink.deliver(&batch).await?;
                        batches += 1;
                    }
                    if let Some(interval) = self.tick_interval {
                        tokio::time::sleep(interval).await;
                    }
                }
                Err(err) if err.is_end_of_stream() => {
                    info!(%err, frames, "sensor session complete");
                    break;
                }
                Err(err) => return Err(SessionError::Read(err)),
            }
        }

        let remainder = self.pipeline.drain();
        if !remainder.is_empty() {
            self.sink.deliver(&remainder).await?;
            batches += 1;
        }

        Ok(SessionSummary { frames, batches })
    }
}
