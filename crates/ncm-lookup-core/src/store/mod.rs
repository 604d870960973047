//! Storage abstraction for the persisted context snapshot.
//!
//! The [`SnapshotStore`] trait is the raw record store behind
//! [`ContextStorage`](crate::storage::ContextStorage): it puts, gets, and
//! deletes records keyed by their `id`, and knows nothing about versions or
//! expiry. Backends are pluggable (SQLite on native targets, in-memory for
//! tests and WASM).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::StoredContext;

/// Abstract record store for [`StoredContext`] snapshots.
///
/// All operations are async (via `async-trait`) so native backends can do
/// real I/O. In-memory implementations return immediately-ready futures.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`put`](SnapshotStore::put) | Insert or replace the record with the same `id` |
/// | [`get`](SnapshotStore::get) | Fetch a record by `id` |
/// | [`delete`](SnapshotStore::delete) | Remove a record by `id` (absent is not an error) |
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace the record keyed by `record.id`.
    async fn put(&self, record: &StoredContext) -> Result<()>;

    /// Fetch the record with the given id.
    async fn get(&self, id: &str) -> Result<Option<StoredContext>>;

    /// Delete the record with the given id.
    async fn delete(&self, id: &str) -> Result<()>;
}
