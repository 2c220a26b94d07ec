//! Content bundles: JSON snapshots of posts, sequences and failures
//!
//! A bundle is how content enters the store, both for the initial page
//! and for every "load more" answer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ThreadError};
use crate::link::Link;
use crate::model::{Post, ReplySequence};
use crate::store::ContentStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Link<Post>>,
    #[serde(default)]
    pub posts: BTreeMap<String, Post>,
    #[serde(default)]
    pub sequences: BTreeMap<String, ReplySequence>,
    /// Links whose fetch failed, with the message to show
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

/// Outcome of merging a bundle into a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub added: usize,
    /// Ids that were already resolved and kept their first value
    pub skipped: Vec<String>,
}

impl MergeReport {
    fn record(&mut self, id: &str, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.added += 1;
                Ok(())
            }
            Err(ThreadError::AlreadyResolved { .. }) => {
                warn!(id, "bundle_duplicate_skipped");
                self.skipped.push(id.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl ContentBundle {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a bundle file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ThreadError::io_operation("read", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| ThreadError::InvalidBundle {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.sequences.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bundle carries an entry (of any kind) for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.posts.contains_key(id)
            || self.sequences.contains_key(id)
            || self.errors.contains_key(id)
    }

    /// Register every entry with `store`.
    ///
    /// Entries whose link is already resolved are skipped and listed in the
    /// report; the store keeps the first value.
    pub fn merge_into(self, store: &mut ContentStore) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for (id, post) in self.posts {
            let outcome = store.register(&Link::<Post>::new(id.as_str()), post);
            report.record(&id, outcome)?;
        }
        for (id, sequence) in self.sequences {
            let outcome = store.register(&Link::<ReplySequence>::new(id.as_str()), sequence);
            report.record(&id, outcome)?;
        }
        for (id, message) in self.errors {
            let outcome = store.mark_error(&Link::<Post>::new(id.as_str()), message);
            report.record(&id, outcome)?;
        }
        debug!(
            added = report.added,
            skipped = report.skipped.len(),
            "bundle_merged"
        );
        Ok(report)
    }

    /// Build a fresh store from this bundle, returning the declared pivot
    pub fn into_store(self) -> Result<(ContentStore, Option<Link<Post>>)> {
        let pivot = self.pivot.clone();
        let mut store = ContentStore::new();
        self.merge_into(&mut store)?;
        Ok((store, pivot))
    }
}
