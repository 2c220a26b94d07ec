//! Thread flattening
//!
//! Turns a partially-loaded content graph into linear, render-ready
//! sequences of [`FlatItem`]s: ancestors of the pivot first (furthest to
//! nearest), then the pivot, then its replies in pre-order.
//!
//! The pass is synchronous and performs no I/O. Its only side effect is the
//! lazy creation of collapse entries; every read is recorded in
//! [`Dependencies`] so callers can tell when the result went stale.

mod ancestors;
mod page;
mod replies;
pub mod types;

pub use page::{flatten_page, Flattened};
pub use types::{
    CollapseButton, FlatItem, FlatLoader, FlatPost, LoadTarget, PageView, RenderOptions,
};

use crate::collapse::{CollapseEntry, CollapseRegistry};
use crate::deps::Dependencies;
use crate::error::Result;
use crate::link::Link;
use crate::model::Post;
use crate::store::{ContentStore, Resolution, Storable};

pub const DEFAULT_TITLE_SEPARATOR: &str = " | ";

/// Knobs that change the shape of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Allow single-reply chains to be threaded
    pub threading: bool,
    pub title_separator: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            threading: true,
            title_separator: DEFAULT_TITLE_SEPARATOR.to_string(),
        }
    }
}

/// State of one flatten pass
pub(crate) struct FlattenCtx<'a> {
    store: &'a ContentStore,
    collapse: &'a mut CollapseRegistry,
    options: &'a FlattenOptions,
    deps: Dependencies,
}

impl<'a> FlattenCtx<'a> {
    pub(crate) fn new(
        store: &'a ContentStore,
        collapse: &'a mut CollapseRegistry,
        options: &'a FlattenOptions,
    ) -> Self {
        FlattenCtx {
            store,
            collapse,
            options,
            deps: Dependencies::new(),
        }
    }

    /// Resolve a link, recording the read
    pub(crate) fn resolve<T: Storable>(&mut self, link: &Link<T>) -> Resolution<'a, T> {
        let store: &'a ContentStore = self.store;
        let key = link.key();
        self.deps.record_store(key.clone(), store.version(&key));
        store.view(link)
    }

    /// Read collapse state, creating it with `default` on first touch
    pub(crate) fn collapse_state(
        &mut self,
        link: &Link<Post>,
        default: Option<bool>,
    ) -> Result<CollapseEntry> {
        let entry = self.collapse.get(link, default)?;
        let key = link.key();
        let version = self.collapse.version(&key);
        self.deps.record_collapse(key, version);
        Ok(entry)
    }

    pub(crate) fn options(&self) -> &FlattenOptions {
        self.options
    }

    pub(crate) fn into_dependencies(self) -> Dependencies {
        self.deps
    }
}
