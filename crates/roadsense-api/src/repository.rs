//! Postgres persistence for classified road-state records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roadsense_core::{ProcessedRecord, RoadState, StoreError, StoreGateway};
use serde::Serialize;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("invalid road state '{0}' in stored row")]
    InvalidRoadState(String),

    #[error("record {0} not found")]
    NotFound(i64),
}

/// A record as the store returns it, id and all, in the flat column shape
/// of the `processed_records` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    pub id: i64,
    pub road_state: RoadState,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn insert_batch(&self, batch: &[ProcessedRecord]) -> Result<(), RepositoryError>;
    async fn fetch(&self, id: i64) -> Result<StoredRecord, RepositoryError>;
    async fn list(&self) -> Result<Vec<StoredRecord>, RepositoryError>;
    async fn update(
        &self,
        id: i64,
        record: &ProcessedRecord,
    ) -> Result<StoredRecord, RepositoryError>;
    async fn delete(&self, id: i64) -> Result<StoredRecord, RepositoryError>;
}

#[derive(Clone)]
pub struct PgRecordRepository {
    pool: PgPool,
}

impl PgRecordRepository {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn map_row(row: &PgRow) -> Result<StoredRecord, RepositoryError> {
    let state_str: String = row.try_get("road_state")?;
    let road_state = RoadState::from_str(&state_str)
        .ok_or_else(|| RepositoryError::InvalidRoadState(state_str.clone()))?;

    Ok(StoredRecord {
        id: row.try_get("id")?,
        road_state,
        x: row.try_get("x")?,
        y: row.try_get("y")?,
        z: row.try_get("z")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        timestamp: row.try_get("timestamp")?,
    })
}

const RECORD_COLUMNS: &str = r#"id, road_state, x, y, z, latitude, longitude, "timestamp""#;

#[async_trait]
impl RecordRepository for PgRecordRepository {
    /// Inserts the whole batch in one transaction: either all records reach
    /// the store or none do.
    async fn insert_batch(&self, batch: &[ProcessedRecord]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for record in batch {
            sqlx::query(
                r#"
                INSERT INTO processed_records
                    (road_state, x, y, z, latitude, longitude, "timestamp")
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.road_state.as_str())
            .bind(record.accelerometer.x)
            .bind(record.accelerometer.y)
            .bind(record.accelerometer.z)
            .bind(record.gps.latitude)
            .bind(record.gps.longitude)
            .bind(record.timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: i64) -> Result<StoredRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM processed_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(&row),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM processed_records ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    async fn update(
        &self,
        id: i64,
        record: &ProcessedRecord,
    ) -> Result<StoredRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE processed_records
            SET road_state = $1,
                x = $2,
                y = $3,
                z = $4,
                latitude = $5,
                longitude = $6,
                "timestamp" = $7
            WHERE id = $8
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.road_state.as_str())
        .bind(record.accelerometer.x)
        .bind(record.accelerometer.y)
        .bind(record.accelerometer.z)
        .bind(record.gps.latitude)
        .bind(record.gps.longitude)
        .bind(record.timestamp)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(&row),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn delete(&self, id: i64) -> Result<StoredRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "DELETE FROM processed_records WHERE id = $1 RETURNING {RECORD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(&row),
            None => Err(RepositoryError::NotFound(id)),
        }
    }
}

/// Adapts the repository to the core `StoreGateway`, so the ingest route
/// delivers through the same store-then-broadcast sink the agents use.
pub struct PgRecordStore {
    repository: Arc<PgRecordRepository>,
}

impl PgRecordStore {
    pub fn new(repository: Arc<PgRecordRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl StoreGateway for PgRecordStore {
    async fn save(&self, batch: &[ProcessedRecord]) -> Result<(), StoreError> {
        self.repository
            .insert_batch(batch)
            .await
            .map_err(|err| StoreError::Unreachable(err.to_string()))
    }
}
