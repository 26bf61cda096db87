use std::fmt;

use thiserror::Error;

/// Identifies which of the three correlated sensor sources an error came
/// from. Every reader error names its stream so the session controller can
/// report the offending source without guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gps,
    Parking,
}

impl SensorKind {
    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gps => "gps",
            SensorKind::Parking => "parking",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {stream} source: {source}")]
    Open {
        stream: SensorKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{stream} source is missing its header line")]
    MissingHeader { stream: SensorKind },

    #[error("{stream} CSV error: {source}")]
    Csv {
        stream: SensorKind,
        #[source]
        source: csv::Error,
    },

    #[error("{stream} data row {line_index} invalid: {message}")]
    Parse {
        stream: SensorKind,
        line_index: usize,
        message: String,
    },

    #[error("{stream} source exhausted")]
    EndOfStream { stream: SensorKind },
}

impl ReadError {
    /// End-of-stream is normal session termination, not a fault; callers
    /// use this to tell the two apart.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadError::EndOfStream { .. })
    }
}
