//! Database schema setup.
//!
//! The schema is versioned with SQLite's `user_version` pragma. Setup runs
//! only when the stored version is below [`SCHEMA_VERSION`], i.e. on the
//! first open of a fresh file or after a schema bump; every other open
//! skips it.

use anyhow::Result;
use log::debug;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Bring the schema of an open pool up to [`SCHEMA_VERSION`].
///
/// Returns whether any setup was performed.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<bool> {
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    if current >= SCHEMA_VERSION {
        return Ok(false);
    }

    debug!(
        "Upgrading snapshot schema from version {} to {}",
        current, SCHEMA_VERSION
    );

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS context (
            id TEXT PRIMARY KEY,
            version TEXT NOT NULL,
            last_updated INTEGER NOT NULL,
            body TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // PRAGMA does not accept bound parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Create the database file and its schema. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}
