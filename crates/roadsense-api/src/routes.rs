use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roadsense_core::ProcessedRecord;
use serde::Serialize;

use crate::repository::{RecordRepository, RepositoryError, StoredRecord};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub stored: usize,
}

/// Accepts an ordered batch, persists it, and pushes it to subscribers.
/// Broadcast never happens for a batch the store refused.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Vec<ProcessedRecord>>,
) -> Result<Json<IngestResponse>, StatusCode> {
    state.sink.deliver(&batch).await.map_err(|err| {
        tracing::error!("batch delivery failed: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(IngestResponse {
        stored: batch.len(),
    }))
}

pub async fn list_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredRecord>>, StatusCode> {
    state
        .repository
        .list()
        .await
        .map(Json)
        .map_err(repository_status)
}

pub async fn fetch_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StoredRecord>, StatusCode> {
    state
        .repository
        .fetch(id)
        .await
        .map(Json)
        .map_err(repository_status)
}

pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(record): Json<ProcessedRecord>,
) -> Result<Json<StoredRecord>, StatusCode> {
    state
        .repository
        .update(id, &record)
        .await
        .map(Json)
        .map_err(repository_status)
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StoredRecord>, StatusCode> {
    state
        .repository
        .delete(id)
        .await
        .map(Json)
        .map_err(repository_status)
}

fn repository_status(err: RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        other => {
            tracing::error!("repository error: {other}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
