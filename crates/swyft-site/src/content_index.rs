//! In-memory index of content records.
//!
//! [`ContentIndex`] owns the id → record map and the ordered list of loaded
//! tabs used for next/previous navigation. Records enter as metadata when
//! their section manifest is registered and are upgraded in place once their
//! body is fetched; nothing is removed except by [`ContentIndex::clear`].
//!
//! # Concurrency
//!
//! Loads of the same section are serialized by a per-section async lock, so
//! concurrent callers never fetch the same items twice. Item fetches within a
//! section run concurrently and are joined on the calling task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::join_all;

use crate::config_store::ConfigStore;
use crate::content::ContentRecord;
use crate::error::SiteError;
use crate::manifest::{FlatEntry, SectionManifest};

/// Direction for relative navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Default)]
struct IndexState {
    records: HashMap<String, Arc<ContentRecord>>,
    /// Loaded tab ids in the order they finished loading.
    tabs: Vec<String>,
}

impl IndexState {
    /// Insert a metadata record unless the id is already known.
    fn register(&mut self, section: &SectionManifest, entry: &FlatEntry) {
        if let Some(existing) = self.records.get(&entry.item.id) {
            if existing.section_id != section.id {
                tracing::warn!(
                    id = %entry.item.id,
                    owner = %existing.section_id,
                    duplicate = %section.id,
                    "Content id declared by two sections, keeping first"
                );
            }
            return;
        }
        let record = ContentRecord {
            id: entry.item.id.clone(),
            title: entry.item.label.clone(),
            nav_label: entry.item.label.clone(),
            file: entry.item.file.clone(),
            blocks: Vec::new(),
            loaded: false,
            section_id: section.id.clone(),
            section_label: section.label.clone(),
            group_id: entry.group_id.clone(),
            group_label: entry.group_label.clone(),
        };
        self.records.insert(record.id.clone(), Arc::new(record));
    }

    /// Store a loaded record, appending it to the tab list on first load.
    fn upgrade(&mut self, record: ContentRecord) -> Arc<ContentRecord> {
        let first_load = !self
            .records
            .get(&record.id)
            .is_some_and(|existing| existing.loaded);
        if first_load {
            self.tabs.push(record.id.clone());
        }
        let record = Arc::new(record);
        self.records.insert(record.id.clone(), Arc::clone(&record));
        record
    }
}

/// Lazily populated content index.
pub struct ContentIndex {
    config: Arc<ConfigStore>,
    state: Mutex<IndexState>,
    section_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ContentIndex {
    #[must_use]
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            state: Mutex::new(IndexState::default()),
            section_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Manifest store this index loads through.
    #[must_use]
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    fn section_lock(&self, section_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.section_locks.lock().unwrap();
        Arc::clone(locks.entry(section_id.to_owned()).or_default())
    }

    /// Section ids from the root manifest, in declaration order.
    pub async fn section_ids(&self) -> Result<Vec<String>, SiteError> {
        let root = self.config.load_root().await?;
        Ok(root.section_ids().map(str::to_owned).collect())
    }

    /// Load a section manifest and register metadata records for its entries
    /// without fetching any bodies.
    ///
    /// A standalone section's page is registered fully loaded.
    pub async fn register(&self, section_id: &str) -> Result<Arc<SectionManifest>, SiteError> {
        let section = self.config.section(section_id).await?;

        let mut state = self.state.lock().unwrap();
        for entry in section.entries() {
            state.register(&section, entry);
        }
        if let Some(body) = &section.body
            && !state.records.get(&section.id).is_some_and(|r| r.loaded)
        {
            let record = ContentRecord {
                id: section.id.clone(),
                title: body.title.clone().unwrap_or_else(|| section.label.clone()),
                nav_label: section.label.clone(),
                file: section.file.clone(),
                blocks: body.blocks.clone(),
                loaded: true,
                section_id: section.id.clone(),
                section_label: section.label.clone(),
                group_id: None,
                group_label: None,
            };
            state.upgrade(record);
        }
        drop(state);

        Ok(section)
    }

    /// Load every not-yet-loaded page of a section.
    ///
    /// A failing section manifest is an error; failing pages are logged and
    /// skipped so the rest of the section still loads. Calls for a section
    /// whose pages are all loaded do no I/O.
    pub async fn ensure_loaded(&self, section_id: &str) -> Result<(), SiteError> {
        let lock = self.section_lock(section_id);
        let _guard = lock.lock().await;

        let section = self.register(section_id).await?;

        let pending: Vec<(Arc<ContentRecord>, String)> = {
            let state = self.state.lock().unwrap();
            section
                .entries()
                .iter()
                .filter_map(|entry| {
                    let record = state.records.get(&entry.item.id)?;
                    if record.loaded || record.section_id != section.id {
                        return None;
                    }
                    let file = record.file.clone()?;
                    Some((Arc::clone(record), file))
                })
                .collect()
        };

        if pending.is_empty() {
            tracing::debug!(section = section_id, "Section already loaded");
            return Ok(());
        }

        tracing::info!(section = section_id, items = pending.len(), "Loading section content");

        let results = join_all(
            pending
                .iter()
                .map(|(_, file)| self.config.load_content(file)),
        )
        .await;

        let mut state = self.state.lock().unwrap();
        for ((record, _), result) in pending.iter().zip(results) {
            match result {
                Ok(body) => {
                    state.upgrade(record.with_body(body));
                }
                Err(e) => {
                    tracing::warn!(section = section_id, id = %record.id, error = %e, "Skipping content item");
                }
            }
        }

        Ok(())
    }

    /// Record for `id`, loaded or not.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<ContentRecord>> {
        self.state.lock().unwrap().records.get(id).cloned()
    }

    /// Record for `id` only if its body has been loaded.
    #[must_use]
    pub fn loaded(&self, id: &str) -> Option<Arc<ContentRecord>> {
        self.get(id).filter(|record| record.loaded)
    }

    /// Fetch the body of a single metadata-only record.
    ///
    /// Returns `Ok(None)` when `id` is not a known record or has no file.
    pub async fn get_or_load_single(
        &self,
        id: &str,
    ) -> Result<Option<Arc<ContentRecord>>, SiteError> {
        let Some(record) = self.get(id) else {
            return Ok(None);
        };
        if record.loaded {
            return Ok(Some(record));
        }
        let Some(file) = record.file.clone() else {
            return Ok(None);
        };

        tracing::debug!(id, %file, "Loading single content item");
        let body = self.config.load_content(&file).await?;
        let loaded = self.state.lock().unwrap().upgrade(record.with_body(body));
        Ok(Some(loaded))
    }

    /// Loaded tab ids in load order.
    #[must_use]
    pub fn tabs(&self) -> Vec<String> {
        self.state.lock().unwrap().tabs.clone()
    }

    /// Loaded records in load order.
    #[must_use]
    pub fn loaded_records(&self) -> Vec<Arc<ContentRecord>> {
        let state = self.state.lock().unwrap();
        state
            .tabs
            .iter()
            .filter_map(|id| state.records.get(id).cloned())
            .collect()
    }

    /// Tab before or after `id` in the loaded list, wrapping at the ends.
    #[must_use]
    pub fn neighbour(&self, id: &str, direction: Direction) -> Option<String> {
        let state = self.state.lock().unwrap();
        let tabs = &state.tabs;
        let position = tabs.iter().position(|tab| tab == id)?;
        let next = match direction {
            Direction::Next => (position + 1) % tabs.len(),
            Direction::Previous => (position + tabs.len() - 1) % tabs.len(),
        };
        tabs.get(next).cloned()
    }

    /// Drop every record, the tab list and cached section manifests.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.records.clear();
        state.tabs.clear();
        drop(state);
        self.config.clear();
        tracing::info!("Content cache cleared");
    }
}
