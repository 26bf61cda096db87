use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::ProcessedRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store rejected the batch: {0}")]
    Rejected(String),

    #[error("store unreachable: {0}")]
    Unreachable(String),
}

/// Durable persistence for a batch of classified records.
///
/// Non-success is retryable, never fatal on first refusal; the sink owns
/// the retry policy.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    async fn save(&self, batch: &[ProcessedRecord]) -> Result<(), StoreError>;
}

/// Best-effort fan-out of a stored batch to live observers.
///
/// Per-subscriber delivery failures stay inside the implementation; the
/// signature is infallible so a dead observer can never fail a flush.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, batch: &[ProcessedRecord]);
}

#[async_trait]
impl<T: StoreGateway + ?Sized> StoreGateway for std::sync::Arc<T> {
    async fn save(&self, batch: &[ProcessedRecord]) -> Result<(), StoreError> {
        (**self).save(batch).await
    }
}

#[async_trait]
impl<T: Broadcaster + ?Sized> Broadcaster for std::sync::Arc<T> {
    async fn broadcast(&self, batch: &[ProcessedRecord]) {
        (**self).broadcast(batch).await
    }
}

/// Fan-out sink for deployments where the store service owns the live
/// subscriber set and pushes after it persists.
pub struct NullBroadcaster;

#[async_trait]
impl Broadcaster for NullBroadcaster {
    async fn broadcast(&self, _batch: &[ProcessedRecord]) {}
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("store rejected batch after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: StoreError,
    },
}

/// Delivers batches store-first: persistence is retried with a bounded
/// policy, and broadcast happens only after durable acceptance. No live
/// update is ever pushed for data that failed to persist.
pub struct BatchSink<S, B> {
    store: S,
    broadcaster: B,
    retry: RetryPolicy,
}

impl<S: StoreGateway, B: Broadcaster> BatchSink<S, B> {
    pub fn new(store: S, broadcaster: B, retry: RetryPolicy) -> Self {
        Self {
            store,
            broadcaster,
            retry,
        }
    }

    /// Persists then broadcasts one batch. On exhausted retries the batch
    /// stays with the caller; nothing is dropped silently.
    pub async fn deliver(&self, batch: &[ProcessedRecord]) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.save(batch).await {
                Ok(()) => break,
                Err(err) if attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %err, "store refused batch, retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(err) => {
                    return Err(SinkError::RetriesExhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
            }
        }

        debug!(records = batch.len(), "batch persisted, broadcasting");
        self.broadcaster.broadcast(batch).await;
        Ok(())
    }
}
