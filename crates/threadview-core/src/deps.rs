//! Read tracking for reactive recomputation
//!
//! A flatten pass records the version of every store entry and collapse
//! entry it reads. The result is stale as soon as any of those versions
//! moves on.

use std::collections::HashMap;

use crate::collapse::CollapseRegistry;
use crate::link::LinkKey;
use crate::store::ContentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    store: HashMap<LinkKey, u64>,
    collapse: HashMap<LinkKey, u64>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_store(&mut self, key: LinkKey, version: u64) {
        self.store.insert(key, version);
    }

    pub fn record_collapse(&mut self, key: LinkKey, version: u64) {
        self.collapse.insert(key, version);
    }

    /// Whether a collapse entry was read
    pub fn reads_collapse(&self, key: &LinkKey) -> bool {
        self.collapse.contains_key(key)
    }

    /// Collapse entries the pass read
    pub fn collapse_reads(&self) -> impl Iterator<Item = &LinkKey> {
        self.collapse.keys()
    }

    /// Whether any recorded read would now observe a different version
    pub fn is_stale(&self, store: &ContentStore, collapse: &CollapseRegistry) -> bool {
        self.store
            .iter()
            .any(|(key, seen)| store.version(key) != *seen)
            || self
                .collapse
                .iter()
                .any(|(key, seen)| collapse.version(key) != *seen)
    }

    /// Number of distinct reads recorded
    pub fn len(&self) -> usize {
        self.store.len() + self.collapse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty() && self.collapse.is_empty()
    }
}
