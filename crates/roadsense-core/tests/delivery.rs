use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use roadsense_core::{
    BatchSink, Broadcaster, ProcessedRecord, RetryPolicy, RoadState, SinkError, StoreError,
    StoreGateway,
};
use roadsense_parser::{AccelerometerSample, AggregatedFrame, GpsSample, ParkingSample};

fn record(state: RoadState) -> ProcessedRecord {
    let frame = AggregatedFrame {
        accelerometer: AccelerometerSample::new(1.0, 2.0, 3.0),
        gps: GpsSample::new(50.0, 30.0),
        parking: ParkingSample::new(5, GpsSample::new(50.0, 30.0)),
        timestamp: Utc::now(),
    };
    ProcessedRecord::new(state, &frame)
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Duration::ZERO,
    }
}

/// Store stub that fails the first `failures` save calls, then accepts.
struct FlakyStore {
    failures: u32,
    calls: Arc<AtomicU32>,
}

impl FlakyStore {
    fn failing_first(failures: u32) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                failures,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl StoreGateway for FlakyStore {
    async fn save(&self, _batch: &[ProcessedRecord]) -> Result<(), StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(StoreError::Unreachable("stub refused".into()))
        } else {
            Ok(())
        }
    }
}

struct RecordingBroadcaster {
    batches: Arc<Mutex<Vec<Vec<ProcessedRecord>>>>,
}

impl RecordingBroadcaster {
    fn new() -> (Self, Arc<Mutex<Vec<Vec<ProcessedRecord>>>>) {
        let batches = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                batches: batches.clone(),
            },
            batches,
        )
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(&self, batch: &[ProcessedRecord]) {
        self.batches
            .lock()
            .expect("broadcaster lock")
            .push(batch.to_vec());
    }
}

#[tokio::test]
async fn successful_store_broadcasts_the_same_batch() {
    let (store, _calls) = FlakyStore::failing_first(0);
    let (broadcaster, batches) = RecordingBroadcaster::new();
    let sink = BatchSink::new(store, broadcaster, fast_retry(3));
    let batch = vec![record(RoadState::Start), record(RoadState::Rough)];

    sink.deliver(&batch).await.expect("delivery");

    let broadcasts = batches.lock().expect("lock");
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0], batch);
}

#[tokio::test]
async fn failing_store_yields_zero_broadcasts() {
    let (store, calls) = FlakyStore::failing_first(u32::MAX);
    let (broadcaster, batches) = RecordingBroadcaster::new();
    let sink = BatchSink::new(store, broadcaster, fast_retry(3));
    let batch = vec![record(RoadState::Start)];

    let err = sink.deliver(&batch).await.expect_err("expected exhaustion");
    match err {
        SinkError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(batches.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn store_recovery_within_policy_still_broadcasts_once() {
    let (store, calls) = FlakyStore::failing_first(2);
    let (broadcaster, batches) = RecordingBroadcaster::new();
    let sink = BatchSink::new(store, broadcaster, fast_retry(3));
    let batch = vec![record(RoadState::Normal)];

    sink.deliver(&batch).await.expect("delivery after retries");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let broadcasts = batches.lock().expect("lock");
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0], batch);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let (store, calls) = FlakyStore::failing_first(u32::MAX);
    let (broadcaster, _batches) = RecordingBroadcaster::new();
    let sink = BatchSink::new(store, broadcaster, fast_retry(3));

    sink.deliver(&[]).await.expect("empty delivery");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
