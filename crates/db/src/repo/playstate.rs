use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct PlayStateRow {
    pub id: String,
    pub status: String,
    pub position: Option<f64>,
    pub updated_ts: Option<i64>,
}

/// Insert or replace the play state for `id`. Last write wins.
pub async fn upsert(pool: &SqlitePool, row: &PlayStateRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO play_state (id, status, position, updated_ts) VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
         status = excluded.status, position = excluded.position, \
         updated_ts = excluded.updated_ts",
    )
    .bind(&row.id)
    .bind(&row.status)
    .bind(row.position)
    .bind(row.updated_ts)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<PlayStateRow>, sqlx::Error> {
    let row: Option<(String, String, Option<f64>, Option<i64>)> = sqlx::query_as(
        "SELECT id, status, position, updated_ts FROM play_state WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| PlayStateRow {
        id: r.0,
        status: r.1,
        position: r.2,
        updated_ts: r.3,
    }))
}
