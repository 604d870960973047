//! Best-effort persistence of the context cache.
//!
//! [`ContextStorage`] keeps exactly one snapshot of an [`NcmContext`] in a
//! [`SnapshotStore`]. The snapshot is advisory: every backend failure is
//! logged and reported to the caller as "nothing stored" or "nothing
//! done", never as an error.
//!
//! A stored snapshot is accepted only when its `version` equals
//! [`CONTEXT_VERSION`] and it is no older than [`RETENTION_MS`].

use anyhow::Result;
use chrono::Utc;
use log::{debug, warn};

use crate::models::{NcmContext, StoredContext};
use crate::store::SnapshotStore;

/// Identifier of the single persisted record.
pub const RECORD_ID: &str = "ncm-context";

/// Format version; any other value invalidates a stored snapshot.
pub const CONTEXT_VERSION: &str = "1.0.0";

/// Retention window: 7 days in milliseconds.
pub const RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Size and age of the stored snapshot, as reported by [`ContextStorage::info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageInfo {
    /// Byte length of the record serialized as JSON.
    pub size: usize,
    /// Epoch milliseconds of the last save.
    pub last_updated: Option<i64>,
}

/// Snapshot persistence over any [`SnapshotStore`] backend.
pub struct ContextStorage<S> {
    store: S,
}

impl<S: SnapshotStore> ContextStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `context`, stamped with the current version and time.
    pub async fn save(&self, context: &NcmContext) {
        let record = to_record(context, now_ms());
        match self.store.put(&record).await {
            Ok(()) => debug!(
                "Saved context snapshot ({} chapters, {} positions)",
                record.chapters.len(),
                record.positions.len()
            ),
            Err(e) => warn!("Failed to save context snapshot: {:#}", e),
        }
    }

    /// Load the stored context, if a valid one exists.
    pub async fn load(&self) -> Option<NcmContext> {
        let record = match self.store.get(RECORD_ID).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to load context snapshot: {:#}", e);
                return None;
            }
        };

        if let Err(reason) = validate(&record, now_ms()) {
            debug!("Ignoring stored context snapshot: {}", reason);
            return None;
        }

        Some(NcmContext {
            chapters: record.chapters,
            positions: record.positions,
        })
    }

    /// Delete the stored snapshot.
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(RECORD_ID).await {
            warn!("Failed to clear context snapshot: {:#}", e);
        }
    }

    /// Size and timestamp of the stored snapshot, or zero/`None` if absent.
    ///
    /// Reports whatever is stored, including stale snapshots.
    pub async fn info(&self) -> StorageInfo {
        match self.try_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!("Failed to read context snapshot info: {:#}", e);
                StorageInfo::default()
            }
        }
    }

    async fn try_info(&self) -> Result<StorageInfo> {
        let Some(record) = self.store.get(RECORD_ID).await? else {
            return Ok(StorageInfo::default());
        };
        let size = serde_json::to_string(&record)?.len();
        Ok(StorageInfo {
            size,
            last_updated: Some(record.last_updated),
        })
    }
}

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Build the persisted record for `context` at time `now`.
pub fn to_record(context: &NcmContext, now: i64) -> StoredContext {
    StoredContext {
        id: RECORD_ID.to_string(),
        chapters: context.chapters.clone(),
        positions: context.positions.clone(),
        version: CONTEXT_VERSION.to_string(),
        last_updated: now,
    }
}

/// Check version and age of a stored record at time `now`.
pub fn validate(record: &StoredContext, now: i64) -> std::result::Result<(), String> {
    if record.version != CONTEXT_VERSION {
        return Err(format!(
            "version {} does not match {}",
            record.version, CONTEXT_VERSION
        ));
    }
    match now.checked_sub(record.last_updated) {
        Some(age) if age <= RETENTION_MS => Ok(()),
        Some(age) => Err(format!("snapshot is {} ms old", age)),
        None => Err(format!("timestamp {} is out of range", record.last_updated)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemorySnapshotStore;

    fn sample_context() -> NcmContext {
        let mut ctx = NcmContext::default();
        ctx.chapters.insert("01".into(), "Animais vivos".into());
        ctx.chapters.insert("84".into(), "Reatores nucleares, caldeiras".into());
        ctx.positions.insert("0101".into(), "Cavalos, asininos e muares".into());
        ctx
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let storage = ContextStorage::new(InMemorySnapshotStore::new());
        let ctx = sample_context();
        storage.save(&ctx).await;
        assert_eq!(storage.load().await, Some(ctx));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let storage = ContextStorage::new(InMemorySnapshotStore::new());
        assert_eq!(storage.load().await, None);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_absent() {
        let store = InMemorySnapshotStore::new();
        let stale = to_record(&sample_context(), now_ms() - RETENTION_MS - 60_000);
        store.put(&stale).await.unwrap();

        let storage = ContextStorage::new(store);
        assert_eq!(storage.load().await, None);
        // Still reported by info.
        assert_eq!(storage.info().await.last_updated, Some(stale.last_updated));
    }

    #[tokio::test]
    async fn test_version_mismatch_is_absent() {
        let store = InMemorySnapshotStore::new();
        let mut record = to_record(&sample_context(), now_ms());
        record.version = "0.9.0".to_string();
        store.put(&record).await.unwrap();

        let storage = ContextStorage::new(store);
        assert_eq!(storage.load().await, None);
    }

    #[test]
    fn test_validate_boundary() {
        let record = to_record(&sample_context(), 0);
        assert!(validate(&record, RETENTION_MS).is_ok());
        assert!(validate(&record, RETENTION_MS + 1).is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_is_absent() {
        let store = InMemorySnapshotStore::new();
        store
            .put(&to_record(&NcmContext::default(), i64::MIN))
            .await
            .unwrap();

        let storage = ContextStorage::new(store);
        assert_eq!(storage.load().await, None);
        assert!(validate(&to_record(&sample_context(), i64::MIN), 0).is_err());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let storage = ContextStorage::new(InMemorySnapshotStore::new());
        storage.store().set_failing(true);

        storage.save(&sample_context()).await;
        assert_eq!(storage.load().await, None);
        storage.clear().await;
        assert_eq!(storage.info().await, StorageInfo::default());

        storage.store().set_failing(false);
        assert!(storage.store().is_empty());
    }

    #[tokio::test]
    async fn test_info_reports_json_size() {
        let storage = ContextStorage::new(InMemorySnapshotStore::new());
        assert_eq!(storage.info().await, StorageInfo::default());

        storage.save(&sample_context()).await;
        let info = storage.info().await;
        let record = storage.store().get(RECORD_ID).await.unwrap().unwrap();
        assert_eq!(info.size, serde_json::to_string(&record).unwrap().len());
        assert_eq!(info.last_updated, Some(record.last_updated));
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let storage = ContextStorage::new(InMemorySnapshotStore::new());
        storage.save(&sample_context()).await;
        storage.clear().await;
        assert_eq!(storage.load().await, None);
        assert_eq!(storage.info().await.size, 0);
    }
}
