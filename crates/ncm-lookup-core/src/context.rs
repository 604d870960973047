//! Chapter and position descriptions for NCM codes.
//!
//! [`ContextCache`] maps the two-digit chapter and four-digit position
//! prefixes of NCM codes to their human-readable descriptions. It is built
//! from the full dataset (only rows whose code is exactly a chapter or a
//! position contribute) or restored from the snapshot kept by
//! [`ContextStorage`].
//!
//! # Build vs. add
//!
//! | Operation | Existing keys | Persists |
//! |-----------|---------------|----------|
//! | [`build_from_dataset`](ContextCache::build_from_dataset) | overwritten | no |
//! | [`add_from_dataset`](ContextCache::add_from_dataset) | kept (first write wins) | when something was added |
//! | [`initialize_with_full_dataset`](ContextCache::initialize_with_full_dataset) | replaced by snapshot or rebuild | after a rebuild |
//!
//! Every mutating operation takes `&mut self`, so a rebuild and the save
//! that follows it cannot interleave with another rebuild. Callers that
//! share a cache across tasks put it behind a lock.

use log::debug;

use crate::codes::{digits_only, key_for_chapter, key_for_position};
use crate::models::{NcmContext, NcmItem};
use crate::storage::ContextStorage;
use crate::store::SnapshotStore;

/// Which level of the hierarchy an item describes.
enum Level {
    Chapter(String),
    Position(String),
}

fn classify(item: &NcmItem) -> Option<Level> {
    match digits_only(&item.code).len() {
        2 => Some(Level::Chapter(key_for_chapter(&item.code))),
        4 => Some(Level::Position(key_for_position(&item.code))),
        _ => None,
    }
}

/// In-memory chapter/position lookup backed by a persisted snapshot.
pub struct ContextCache<S> {
    context: NcmContext,
    initialized: bool,
    storage: ContextStorage<S>,
}

impl<S: SnapshotStore> ContextCache<S> {
    pub fn new(storage: ContextStorage<S>) -> Self {
        Self {
            context: NcmContext::default(),
            initialized: false,
            storage,
        }
    }

    pub fn context(&self) -> &NcmContext {
        &self.context
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn storage(&self) -> &ContextStorage<S> {
        &self.storage
    }

    /// Fill the cache from `items`, overwriting existing keys.
    ///
    /// Does nothing when the cache is already initialized and `force` is
    /// false.
    pub fn build_from_dataset(&mut self, items: &[NcmItem], force: bool) {
        if self.initialized && !force {
            return;
        }

        for item in items {
            match classify(item) {
                Some(Level::Chapter(key)) => {
                    self.context.chapters.insert(key, item.description.clone());
                }
                Some(Level::Position(key)) => {
                    self.context.positions.insert(key, item.description.clone());
                }
                None => {}
            }
        }

        self.initialized = true;
    }

    /// Add descriptions for keys not yet present and persist if any were added.
    ///
    /// Returns whether the cache changed.
    pub async fn add_from_dataset(&mut self, items: &[NcmItem]) -> bool {
        let mut changed = false;

        for item in items {
            let map = match classify(item) {
                Some(Level::Chapter(key)) => Some((&mut self.context.chapters, key)),
                Some(Level::Position(key)) => Some((&mut self.context.positions, key)),
                None => None,
            };
            if let Some((map, key)) = map {
                if !map.contains_key(&key) {
                    map.insert(key, item.description.clone());
                    changed = true;
                }
            }
        }

        if changed {
            self.storage.save(&self.context).await;
        }
        changed
    }

    /// Adopt the stored snapshot, or rebuild from `items` and persist.
    pub async fn initialize_with_full_dataset(&mut self, items: &[NcmItem]) {
        if self.load_stored().await {
            return;
        }

        debug!("No usable context snapshot; rebuilding from {} items", items.len());
        self.clear();
        self.build_from_dataset(items, true);
        self.storage.save(&self.context).await;
    }

    /// Hydrate from the stored snapshot only. Returns whether it succeeded.
    pub async fn load_stored(&mut self) -> bool {
        match self.storage.load().await {
            Some(context) => {
                debug!(
                    "Restored context snapshot ({} chapters, {} positions)",
                    context.chapters.len(),
                    context.positions.len()
                );
                self.context = context;
                self.initialized = true;
                true
            }
            None => false,
        }
    }

    /// Chapter description, or `Grupo {key}` when unknown.
    pub fn describe_chapter(&self, code: &str) -> String {
        let key = key_for_chapter(code);
        match self.context.chapters.get(&key) {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("Grupo {}", key),
        }
    }

    /// Position description, or `Posição {aa}.{bb}` when unknown.
    pub fn describe_position(&self, code: &str) -> String {
        let key = key_for_position(code);
        match self.context.positions.get(&key) {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("Posição {}.{}", &key[..2], &key[2..]),
        }
    }

    /// Describe `code` at the level its length implies.
    ///
    /// Two-digit codes get their chapter; everything else falls back to
    /// the position.
    pub fn describe(&self, code: &str) -> String {
        if digits_only(code).len() == 2 {
            self.describe_chapter(code)
        } else {
            self.describe_position(code)
        }
    }

    /// Empty the in-memory maps. Persisted state is left alone.
    pub fn clear(&mut self) {
        self.context.clear();
        self.initialized = false;
    }

    /// Delete the persisted snapshot, then [`clear`](Self::clear).
    pub async fn clear_persisted(&mut self) {
        self.storage.clear().await;
        self.clear();
    }
}
