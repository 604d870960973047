//! Working dataset held in memory.
//!
//! [`DatasetHolder`] keeps the full NCM table, the currently filtered view,
//! and a loading flag. Setting the full table hydrates the owned
//! [`ContextCache`] from it.

use log::debug;

use crate::context::ContextCache;
use crate::models::NcmItem;
use crate::store::SnapshotStore;

pub struct DatasetHolder<S> {
    full: Vec<NcmItem>,
    filtered: Vec<NcmItem>,
    loading: bool,
    context: ContextCache<S>,
}

impl<S: SnapshotStore> DatasetHolder<S> {
    pub fn new(context: ContextCache<S>) -> Self {
        Self {
            full: Vec::new(),
            filtered: Vec::new(),
            loading: false,
            context,
        }
    }

    /// Return the full dataset.
    ///
    /// Nothing is fetched here: the table arrives through
    /// [`set_full`](Self::set_full). While the holder is empty this yields
    /// an empty sequence. The loading flag is raised and lowered within
    /// this one call, so [`is_loading`](Self::is_loading) never observes it
    /// set.
    pub fn load_full(&mut self) -> Vec<NcmItem> {
        if !self.full.is_empty() {
            return self.full.clone();
        }

        self.loading = true;
        let data = self.full.clone();
        self.loading = false;
        data
    }

    /// Replace the full dataset and hydrate the context cache with it.
    pub async fn set_full(&mut self, data: Vec<NcmItem>) {
        debug!("Setting full dataset ({} items)", data.len());
        self.full = data;
        self.context.initialize_with_full_dataset(&self.full).await;
    }

    pub fn set_filtered(&mut self, data: Vec<NcmItem>) {
        self.filtered = data;
    }

    pub fn filtered(&self) -> &[NcmItem] {
        &self.filtered
    }

    pub fn full(&self) -> &[NcmItem] {
        &self.full
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn context(&self) -> &ContextCache<S> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextCache<S> {
        &mut self.context
    }
}
