//! In-memory [`SnapshotStore`] implementation for testing and WASM targets.
//!
//! Uses a `HashMap` behind `std::sync::RwLock` for thread safety. A store
//! can be switched into a failing mode to exercise the error paths of
//! callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::StoredContext;

use super::SnapshotStore;

/// In-memory snapshot store for testing and WASM environments.
pub struct InMemorySnapshotStore {
    records: RwLock<HashMap<String, StoredContext>>,
    failing: AtomicBool,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of records currently held.
    ///
    /// Reads through a poisoned lock and counts whatever the map holds. The
    /// [`SnapshotStore`] methods report poisoning as an error instead.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("in-memory snapshot store is unavailable");
        }
        Ok(())
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn put(&self, record: &StoredContext) -> Result<()> {
        self.check()?;
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredContext>> {
        self.check()?;
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        Ok(records.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check()?;
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("snapshot store lock poisoned"))?;
        records.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: &str) -> StoredContext {
        StoredContext {
            id: id.to_string(),
            chapters: BTreeMap::from([("01".to_string(), "Animais vivos".to_string())]),
            positions: BTreeMap::new(),
            version: "1.0.0".to_string(),
            last_updated: 1,
        }
    }

    #[tokio::test]
    async fn test_put_replaces_same_id() {
        let store = InMemorySnapshotStore::new();
        store.put(&record("a")).await.unwrap();
        let mut newer = record("a");
        newer.last_updated = 2;
        store.put(&newer).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").await.unwrap().unwrap().last_updated, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = InMemorySnapshotStore::new();
        store.delete("nope").await.unwrap();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_poisoned_lock() {
        let store = InMemorySnapshotStore::new();
        store.put(&record("a")).await.unwrap();

        let poisoned = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.records.write().unwrap();
                panic!("writer panicked");
            })
            .join()
        });
        assert!(poisoned.is_err());

        assert_eq!(store.len(), 1);
        assert!(store.get("a").await.is_err());
        assert!(store.put(&record("b")).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let store = InMemorySnapshotStore::new();
        store.set_failing(true);
        assert!(store.put(&record("a")).await.is_err());
        assert!(store.get("a").await.is_err());
        store.set_failing(false);
        assert!(store.get("a").await.unwrap().is_none());
    }
}
