use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::errors::{ReadError, SensorKind};
use crate::model::{AccelerometerSample, AggregatedFrame, GpsSample, ParkingSample};

/// One line-oriented sensor source, positioned past its header line.
///
/// Tracks a 1-based line index (the header is line 1) so parse errors can
/// point at the offending row.
struct SensorStream<R: Read> {
    kind: SensorKind,
    records: StringRecordsIntoIter<R>,
    line_index: usize,
}

impl<R: Read> SensorStream<R> {
    fn open(kind: SensorKind, reader: R) -> Result<Self, ReadError> {
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        // Skip the header/label line; a source without one is malformed.
        match records.next() {
            Some(Ok(_)) => {}
            Some(Err(source)) => return Err(ReadError::Csv { stream: kind, source }),
            None => return Err(ReadError::MissingHeader { stream: kind }),
        }

        Ok(Self {
            kind,
            records,
            line_index: 1,
        })
    }

    fn next_record(&mut self) -> Result<StringRecord, ReadError> {
        self.line_index += 1;
        match self.records.next() {
            Some(Ok(record)) => Ok(record),
            Some(Err(source)) => Err(ReadError::Csv {
                stream: self.kind,
                source,
            }),
            None => Err(ReadError::EndOfStream { stream: self.kind }),
        }
    }
}

fn parse_field_f64<R: Read>(
    stream: &SensorStream<R>,
    record: &StringRecord,
    index: usize,
    column: &str,
) -> Result<f64, ReadError> {
    let raw = record.get(index).ok_or_else(|| ReadError::Parse {
        stream: stream.kind,
        line_index: stream.line_index,
        message: format!("missing column '{column}'"),
    })?;
    raw.trim().parse::<f64>().map_err(|err| ReadError::Parse {
        stream: stream.kind,
        line_index: stream.line_index,
        message: format!("failed to parse column '{column}' as float: {err}"),
    })
}

fn parse_field_i64<R: Read>(
    stream: &SensorStream<R>,
    record: &StringRecord,
    index: usize,
    column: &str,
) -> Result<i64, ReadError> {
    let raw = record.get(index).ok_or_else(|| ReadError::Parse {
        stream: stream.kind,
        line_index: stream.line_index,
        message: format!("missing column '{column}'"),
    })?;
    raw.trim().parse::<i64>().map_err(|err| ReadError::Parse {
        stream: stream.kind,
        line_index: stream.line_index,
        message: format!("failed to parse column '{column}' as integer: {err}"),
    })
}

/// Reads one correlated [`AggregatedFrame`] per tick from three independent
/// line-oriented sensor sources, owning their lifecycle as a single scoped
/// acquisition.
///
/// The sources advance strictly in lock-step: one [`read_frame`] call
/// consumes exactly one record line from each. The reader never skips or
/// resynchronizes on a bad line; the caller decides whether to abort or
/// drop the tick. All three handles are released together when the reader
/// is dropped, on every exit path.
///
/// [`read_frame`]: FrameReader::read_frame
pub struct FrameReader<R: Read> {
    accelerometer: SensorStream<R>,
    gps: SensorStream<R>,
    parking: SensorStream<R>,
}

impl FrameReader<File> {
    /// Opens the three sensor files and positions each past its header.
    pub fn open(
        accelerometer_path: impl AsRef<Path>,
        gps_path: impl AsRef<Path>,
        parking_path: impl AsRef<Path>,
    ) -> Result<Self, ReadError> {
        let accelerometer = open_file(SensorKind::Accelerometer, accelerometer_path.as_ref())?;
        let gps = open_file(SensorKind::Gps, gps_path.as_ref())?;
        let parking = open_file(SensorKind::Parking, parking_path.as_ref())?;
        Self::from_readers(accelerometer, gps, parking)
    }
}

fn open_file(kind: SensorKind, path: &Path) -> Result<File, ReadError> {
    File::open(path).map_err(|source| ReadError::Open {
        stream: kind,
        source,
    })
}

impl<R: Read> FrameReader<R> {
    /// Builds a reader over arbitrary byte sources. Tests and non-file
    /// transports use this; [`FrameReader::open`] wraps it for files.
    pub fn from_readers(accelerometer: R, gps: R, parking: R) -> Result<Self, ReadError> {
        Ok(Self {
            accelerometer: SensorStream::open(SensorKind::Accelerometer, accelerometer)?,
            gps: SensorStream::open(SensorKind::Gps, gps)?,
            parking: SensorStream::open(SensorKind::Parking, parking)?,
        })
    }

    /// Reads exactly one record line from each source and stamps the
    /// aggregate with the current wall-clock time.
    ///
    /// End-of-stream on any one source ends the session with
    /// [`ReadError::EndOfStream`]; partial frames are never synthesized.
    pub fn read_frame(&mut self) -> Result<AggregatedFrame, ReadError> {
        let accelerometer_record = self.accelerometer.next_record()?;
        let gps_record = self.gps.next_record()?;
        let parking_record = self.parking.next_record()?;

        let accelerometer = AccelerometerSample::new(
            parse_field_f64(&self.accelerometer, &accelerometer_record, 0, "x")?,
            parse_field_f64(&self.accelerometer, &accelerometer_record, 1, "y")?,
            parse_field_f64(&self.accelerometer, &accelerometer_record, 2, "z")?,
        );

        let gps = GpsSample::new(
            parse_field_f64(&self.gps, &gps_record, 0, "latitude")?,
            parse_field_f64(&self.gps, &gps_record, 1, "longitude")?,
        );

        // Parking rows are count,lat,lon: three distinct fields.
        let parking = ParkingSample::new(
            parse_field_i64(&self.parking, &parking_record, 0, "empty_count")?,
            GpsSample::new(
                parse_field_f64(&self.parking, &parking_record, 1, "latitude")?,
                parse_field_f64(&self.parking, &parking_record, 2, "longitude")?,
            ),
        );

        Ok(AggregatedFrame {
            accelerometer,
            gps,
            parking,
            timestamp: Utc::now(),
        })
    }
}
