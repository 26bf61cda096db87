use std::collections::HashMap;

use async_trait::async_trait;
use roadsense_core::{Broadcaster, ProcessedRecord};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Live set of connected observers awaiting pushed batches.
///
/// Handles are identity-keyed; membership changes only on connect and
/// disconnect. Broadcast snapshots the senders under the lock and sends
/// outside it, so membership churn mid-broadcast never raises and a dead
/// handle never blocks delivery to the rest.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<Uuid, UnboundedSender<String>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, sender: UnboundedSender<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.subscribers.lock().await.insert(id, sender);
        debug!(subscriber = %id, "subscriber registered");
        id
    }

    pub async fn remove(&self, id: Uuid) {
        if self.subscribers.lock().await.remove(&id).is_some() {
            debug!(subscriber = %id, "subscriber deregistered");
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[async_trait]
impl Broadcaster for SubscriberRegistry {
    async fn broadcast(&self, batch: &[ProcessedRecord]) {
        let payload = match serde_json::to_string(batch) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize batch for broadcast");
                return;
            }
        };

        let snapshot: Vec<(Uuid, UnboundedSender<String>)> = self
            .subscribers
            .lock()
            .await
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut dead = Vec::new();
        for (id, sender) in snapshot {
            if sender.send(payload.clone()).is_err() {
                warn!(subscriber = %id, "subscriber channel closed, pruning");
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.lock().await;
            for id in dead {
                subscribers.remove(&id);
            }
        }
    }
}
