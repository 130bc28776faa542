use chrono::Utc;
use flash_core::model::{CardStats, StatsMap};
use sqlx::{Row, SqliteConnection};

use super::SqliteRepository;
use crate::blob::{self, STATS_KEY};
use crate::repository::{StatsStore, StorageError};

fn conn_err<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

async fn read_blob(conn: &mut SqliteConnection) -> Result<StatsMap, StorageError> {
    let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
        .bind(STATS_KEY)
        .fetch_optional(&mut *conn)
        .await
        .map_err(conn_err)?;

    match row {
        Some(row) => {
            let raw: String = row
                .try_get("value")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            blob::decode(&raw)
        }
        None => Ok(StatsMap::new()),
    }
}

async fn write_blob(conn: &mut SqliteConnection, stats: &StatsMap) -> Result<(), StorageError> {
    let raw = blob::encode(stats)?;
    sqlx::query(
        r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
        ",
    )
    .bind(STATS_KEY)
    .bind(raw)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(conn_err)?;
    Ok(())
}

#[async_trait::async_trait]
impl StatsStore for SqliteRepository {
    async fn load_all(&self) -> Result<StatsMap, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(conn_err)?;
        read_blob(&mut conn).await
    }

    async fn save_one(&self, stats: &CardStats) -> Result<(), StorageError> {
        self.save_batch(std::slice::from_ref(stats)).await
    }

    async fn save_batch(&self, stats: &[CardStats]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn_err)?;

        let mut all = read_blob(&mut tx).await?;
        blob::merge(&mut all, stats);
        write_blob(&mut tx, &all).await?;

        tx.commit().await.map_err(conn_err)?;
        tracing::debug!(records = stats.len(), total = all.len(), "stats blob written");
        Ok(())
    }
}
