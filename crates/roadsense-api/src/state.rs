use std::sync::Arc;

use roadsense_core::{BatchSink, RetryPolicy};

use crate::registry::SubscriberRegistry;
use crate::repository::{PgRecordRepository, PgRecordStore};

/// Shared service state: the repository for reads, the registry for
/// subscriber lifecycle, and the sink that couples persist and broadcast
/// for every ingested batch.
pub struct AppState {
    pub repository: Arc<PgRecordRepository>,
    pub registry: Arc<SubscriberRegistry>,
    pub sink: BatchSink<PgRecordStore, Arc<SubscriberRegistry>>,
}

impl AppState {
    pub async fn new(database_url: &str) -> anyhow::Result<Arc<Self>> {
        let repository = Arc::new(PgRecordRepository::connect(database_url, 5).await?);
        repository.run_migrations().await?;

        let registry = Arc::new(SubscriberRegistry::new());
        let sink = BatchSink::new(
            PgRecordStore::new(repository.clone()),
            registry.clone(),
            RetryPolicy::default(),
        );

        Ok(Arc::new(Self {
            repository,
            registry,
            sink,
        }))
    }
}
