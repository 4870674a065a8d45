use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pith_core::{PlayState, PlayStatus};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::debug;

use crate::repo::playstate::{self, PlayStateRow};
use crate::StoreError;

/// Process-wide keyed play-state store. One record per id; last write wins.
#[async_trait::async_trait]
pub trait PlayStateStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<PlayState>, StoreError>;
    async fn put(&self, state: &PlayState) -> Result<(), StoreError>;
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqlitePlayStateStore {
    pool: SqlitePool,
}

impl SqlitePlayStateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlayStateStore for SqlitePlayStateStore {
    async fn get(&self, id: &str) -> Result<Option<PlayState>, StoreError> {
        let Some(row) = playstate::get(&self.pool, id).await? else {
            return Ok(None);
        };

        let status = PlayStatus::parse(&row.status).ok_or_else(|| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("unknown status {:?}", row.status),
        })?;

        Ok(Some(PlayState {
            id: row.id,
            status,
            position: row.position,
            updated: row.updated_ts.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        }))
    }

    async fn put(&self, state: &PlayState) -> Result<(), StoreError> {
        debug!(id = %state.id, status = %state.status, "storing play state");
        let row = PlayStateRow {
            id: state.id.clone(),
            status: state.status.as_str().to_string(),
            position: state.position,
            updated_ts: state.updated.map(|t| t.timestamp()),
        };
        playstate::upsert(&self.pool, &row).await?;
        Ok(())
    }
}

/// In-memory store, for tests and database-less runs.
#[derive(Default)]
pub struct MemoryPlayStateStore {
    states: RwLock<HashMap<String, PlayState>>,
}

impl MemoryPlayStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PlayStateStore for MemoryPlayStateStore {
    async fn get(&self, id: &str) -> Result<Option<PlayState>, StoreError> {
        Ok(self.states.read().await.get(id).cloned())
    }

    async fn put(&self, state: &PlayState) -> Result<(), StoreError> {
        self.states
            .write()
            .await
            .insert(state.id.clone(), state.clone());
        Ok(())
    }
}
