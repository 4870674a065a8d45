pub mod migrate;
pub mod repo;
pub mod store;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

pub use store::{MemoryPlayStateStore, PlayStateStore, SqlitePlayStateStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("corrupt play state record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<StoreError> for pith_core::ChannelError {
    fn from(e: StoreError) -> Self {
        pith_core::ChannelError::Store(e.to_string())
    }
}

/// Create a SQLite connection pool with WAL mode enabled.
///
/// `:memory:` gets a single connection so every query sees the same database.
pub async fn connect(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = db_path == ":memory:";
    if !in_memory {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let mut opts = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);
    if !in_memory {
        opts = opts.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .connect_with(opts)
        .await?;

    Ok(pool)
}
