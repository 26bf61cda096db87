pub mod errors;
pub mod model;
pub mod reader;

pub use errors::{ReadError, SensorKind};
pub use model::{AccelerometerSample, AggregatedFrame, GpsSample, ParkingSample};
pub use reader::FrameReader;
