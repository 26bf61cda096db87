pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod session;
pub mod sink;

pub use classifier::{classify, ROUGH_THRESHOLD, SMOOTH_THRESHOLD};
pub use error::SessionError;
pub use pipeline::{StreamPipeline, DEFAULT_BATCH_SIZE};
pub use record::{ProcessedRecord, RoadState};
pub use session::{SensorSession, SessionSummary};
pub use sink::{
    BatchSink, Broadcaster, NullBroadcaster, RetryPolicy, SinkError, StoreError, StoreGateway,
};
