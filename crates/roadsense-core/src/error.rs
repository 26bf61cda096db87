use roadsense_parser::ReadError;
use thiserror::Error;

use crate::sink::SinkError;

/// Session-level fault, reported once by the controller. End-of-stream is
/// not represented here; it ends a session normally.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sensor read failed: {0}")]
    Read(#[from] ReadError),

    #[error("batch delivery failed: {0}")]
    Sink(#[from] SinkError),
}
