//! Context cache CLI commands: `hydrate`, `describe`, `info`, and `clear`.
//!
//! Every command works against the snapshot kept in the configured SQLite
//! database. `hydrate` is the only one that needs the dataset, read either
//! from a JSON file or from the backend.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use std::path::Path;

use ncm_lookup_core::context::ContextCache;
use ncm_lookup_core::dataset::DatasetHolder;
use ncm_lookup_core::format::decode_html_entities;
use ncm_lookup_core::models::NcmItem;
use ncm_lookup_core::storage::{now_ms, ContextStorage, RETENTION_MS};

use crate::backend::BackendClient;
use crate::config::Config;
use crate::sqlite_store::SqliteSnapshotStore;

/// Context cache over the configured database.
pub fn open_cache(config: &Config) -> ContextCache<SqliteSnapshotStore> {
    ContextCache::new(ContextStorage::new(SqliteSnapshotStore::from_config(config)))
}

/// Read a dataset from a JSON array of NCM rows.
pub fn read_dataset(path: &Path) -> Result<Vec<NcmItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset file: {}", path.display()))
}

/// Where `hydrate` takes its rows from.
pub enum DatasetSource<'a> {
    File(&'a Path),
    Backend,
}

/// How `hydrate` combines the rows with what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateMode {
    /// Adopt a valid snapshot, else rebuild from the dataset.
    Initialize,
    /// Drop the snapshot and rebuild from the dataset.
    Rebuild,
    /// Keep stored descriptions and add only unknown keys.
    Add,
}

async fn fetch_dataset(config: &Config, source: DatasetSource<'_>) -> Result<Vec<NcmItem>> {
    match source {
        DatasetSource::File(path) => read_dataset(path),
        DatasetSource::Backend => {
            let client = BackendClient::new(config.backend()?)?;
            client.fetch_items().await
        }
    }
}

/// Load the dataset and hydrate the context cache from it.
pub async fn run_hydrate(
    config: &Config,
    source: DatasetSource<'_>,
    mode: HydrateMode,
) -> Result<()> {
    let items = fetch_dataset(config, source).await?;
    let rows = items.len();
    let mut holder = DatasetHolder::new(open_cache(config));

    match mode {
        HydrateMode::Initialize => holder.set_full(items).await,
        HydrateMode::Rebuild => {
            holder.context_mut().clear_persisted().await;
            holder.set_full(items).await;
        }
        HydrateMode::Add => {
            let cache = holder.context_mut();
            cache.load_stored().await;
            let added = cache.add_from_dataset(&items).await;
            if !added {
                println!("hydrate: nothing new to add");
            }
        }
    }

    let cache = holder.context();
    let info = cache.storage().info().await;
    println!("hydrate");
    println!("  rows:       {}", rows);
    println!("  chapters:   {}", cache.context().chapters.len());
    println!("  positions:  {}", cache.context().positions.len());
    println!("  snapshot:   {}", format_bytes(info.size as u64));

    cache.storage().store().close().await;
    Ok(())
}

/// Print the description of each code, restored from the snapshot.
pub async fn run_describe(config: &Config, codes: &[String]) -> Result<()> {
    let mut cache = open_cache(config);
    if !cache.load_stored().await {
        warn!("No valid context snapshot stored; run `ncm hydrate` first");
    }

    for code in codes {
        println!("{}\t{}", code, decode_html_entities(&cache.describe(code)));
    }

    cache.storage().store().close().await;
    Ok(())
}

/// Print size and age of the stored snapshot.
pub async fn run_info(config: &Config) -> Result<()> {
    let storage = ContextStorage::new(SqliteSnapshotStore::from_config(config));
    let info = storage.info().await;

    println!("NCM Lookup — Context Snapshot");
    println!("=============================");
    println!();
    println!("  Database:    {}", config.db.path.display());

    match info.last_updated {
        Some(ts) => {
            let valid = storage.load().await.is_some();
            println!("  Size:        {}", format_bytes(info.size as u64));
            println!("  Updated:     {}", format_ts_ms(ts));
            println!("  Status:      {}", snapshot_status(valid, ts, now_ms()));
        }
        None => println!("  Snapshot:    none"),
    }

    storage.store().close().await;
    Ok(())
}

/// Delete the stored snapshot.
pub async fn run_clear(config: &Config) -> Result<()> {
    let mut cache = open_cache(config);
    cache.clear_persisted().await;
    cache.storage().store().close().await;
    println!("Context snapshot cleared.");
    Ok(())
}

/// Label for a stored snapshot: it loaded, it aged out, or it was rejected
/// for its format.
fn snapshot_status(valid: bool, last_updated: i64, now: i64) -> &'static str {
    if valid {
        "valid"
    } else if now.saturating_sub(last_updated) > RETENTION_MS {
        "expired"
    } else {
        "stale format"
    }
}

fn format_ts_ms(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
