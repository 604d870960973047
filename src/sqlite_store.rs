//! SQLite-backed [`SnapshotStore`] implementation.
//!
//! The pool is opened lazily on the first operation and reused for the
//! lifetime of the store; schema setup runs as part of that first open.
//! Each record is kept as its JSON body next to `version` and
//! `last_updated` columns so it can be inspected with plain SQL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;

use ncm_lookup_core::models::StoredContext;
use ncm_lookup_core::store::SnapshotStore;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`SnapshotStore`] trait.
pub struct SqliteSnapshotStore {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl SqliteSnapshotStore {
    /// Store over the database at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.db.path.clone())
    }

    /// The shared pool, opening it (and setting up the schema) on first use.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async move {
                let pool = db::connect_path(&self.path).await?;
                migrate::ensure_schema(&pool).await?;
                Ok::<_, anyhow::Error>(pool)
            })
            .await
    }

    /// Close the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn put(&self, record: &StoredContext) -> Result<()> {
        let pool = self.pool().await?;
        let body = serde_json::to_string(record)?;

        sqlx::query(
            r#"
            INSERT INTO context (id, version, last_updated, body)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                version = excluded.version,
                last_updated = excluded.last_updated,
                body = excluded.body
            "#,
        )
        .bind(&record.id)
        .bind(&record.version)
        .bind(record.last_updated)
        .bind(&body)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredContext>> {
        let pool = self.pool().await?;

        let row = sqlx::query("SELECT body FROM context WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                let record = serde_json::from_str(&body)
                    .with_context(|| format!("Corrupt snapshot record: {}", id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM context WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
