//! Interactive session: owns the store and collapse state for one view
//!
//! The session caches the last [`PageView`] together with the
//! [`Dependencies`] it was computed from, and only flattens again when the
//! pivot changed or something the last pass read has moved on.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, warn};

use crate::bundle::{ContentBundle, MergeReport};
use crate::collapse::CollapseRegistry;
use crate::config::Config;
use crate::deps::Dependencies;
use crate::error::Result;
use crate::flatten::{flatten_page, FlattenOptions, PageView};
use crate::link::{Link, LinkKey};
use crate::model::{Loader, Post, ReplyRef};
use crate::source::ContentSource;
use crate::store::{ContentStore, Resolution};
use crate::trace_time;

#[derive(Debug)]
struct Cached {
    pivot: Link<Post>,
    view: PageView,
    deps: Dependencies,
}

impl Cached {
    fn is_fresh(
        &self,
        pivot: &Link<Post>,
        store: &ContentStore,
        collapse: &CollapseRegistry,
    ) -> bool {
        self.pivot == *pivot && !self.deps.is_stale(store, collapse)
    }
}

#[derive(Debug)]
pub struct Session {
    store: ContentStore,
    collapse: CollapseRegistry,
    pivot: Link<Post>,
    options: FlattenOptions,
    evict_unreachable: bool,
    cached: Option<Cached>,
    recomputes: u64,
}

impl Session {
    pub fn new(store: ContentStore, pivot: Link<Post>, options: FlattenOptions) -> Self {
        Session {
            store,
            collapse: CollapseRegistry::new(),
            pivot,
            options,
            evict_unreachable: false,
            cached: None,
            recomputes: 0,
        }
    }

    pub fn from_config(store: ContentStore, pivot: Link<Post>, config: &Config) -> Self {
        let mut session = Session::new(store, pivot, config.flatten_options());
        session.evict_unreachable = config.collapse.evict_unreachable;
        session
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn collapse(&self) -> &CollapseRegistry {
        &self.collapse
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    pub fn pivot(&self) -> &Link<Post> {
        &self.pivot
    }

    /// Re-center the view on another post
    pub fn set_pivot(&mut self, pivot: Link<Post>) {
        if pivot != self.pivot {
            debug!(from = %self.pivot, to = %pivot, "repivot");
            self.pivot = pivot;
        }
    }

    pub fn set_threading(&mut self, threading: bool) {
        if self.options.threading != threading {
            self.options.threading = threading;
            self.cached = None;
        }
    }

    /// Whether the next [`view`](Self::view) call has to flatten again
    pub fn is_stale(&self) -> bool {
        match &self.cached {
            Some(cached) => !cached.is_fresh(&self.pivot, &self.store, &self.collapse),
            None => true,
        }
    }

    /// The current page view, recomputed only when stale
    pub fn view(&mut self) -> Result<&PageView> {
        let cached = match self.cached.take() {
            Some(cached) if cached.is_fresh(&self.pivot, &self.store, &self.collapse) => cached,
            _ => self.recompute()?,
        };
        Ok(&self.cached.insert(cached).view)
    }

    /// Number of flatten passes run so far
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    #[tracing::instrument(skip(self), fields(pivot = %self.pivot))]
    fn recompute(&mut self) -> Result<Cached> {
        let start = Instant::now();
        let flattened = flatten_page(&self.store, &mut self.collapse, &self.pivot, &self.options)?;
        self.recomputes += 1;

        if self.evict_unreachable {
            let deps = &flattened.deps;
            let hidden = hidden_under_collapsed(&self.store, &self.collapse, deps);
            let evicted = self
                .collapse
                .retain(|key| deps.reads_collapse(key) || hidden.contains(key));
            if evicted > 0 {
                debug!(evicted, "collapse_entries_evicted");
            }
        }

        trace_time!(start, "recompute", count = self.recomputes);
        Ok(Cached {
            pivot: self.pivot.clone(),
            view: flattened.view,
            deps: flattened.deps,
        })
    }

    /// Flip a post's collapse flag; the post must have been rendered
    pub fn toggle_collapsed(&mut self, link: &Link<Post>) -> Result<bool> {
        self.collapse.toggle(link)
    }

    /// Force a post's collapse flag, creating its entry if needed
    pub fn set_collapsed(&mut self, link: &Link<Post>, collapsed: bool) -> bool {
        self.collapse.set_collapsed(link, collapsed)
    }

    pub fn hover_enter(&mut self, link: &Link<Post>) -> Result<u32> {
        self.collapse.hover_enter(link)
    }

    pub fn hover_leave(&mut self, link: &Link<Post>) -> Result<u32> {
        self.collapse.hover_leave(link)
    }

    /// Merge more content into the store
    pub fn register(&mut self, bundle: ContentBundle) -> Result<MergeReport> {
        bundle.merge_into(&mut self.store)
    }

    /// Fetch the content behind `loader` and merge it.
    ///
    /// On failure the store is untouched and the loader stays pending.
    pub fn load_more(
        &mut self,
        loader: &Loader,
        source: &dyn ContentSource,
    ) -> Result<MergeReport> {
        if self.store.contains(&loader.key) {
            debug!(key = %loader.key, "loader_already_resolved");
            return Ok(MergeReport::default());
        }
        let bundle = source.fetch(loader).inspect_err(|e| {
            warn!(key = %loader.key, error = %e, "load_more_failed");
        })?;
        if !bundle.contains(loader.key.id()) {
            warn!(key = %loader.key, "bundle_missing_loader_key");
        }
        let report = self.register(bundle)?;
        debug!(key = %loader.key, added = report.added, "load_more");
        Ok(report)
    }

    /// Loaders visible in the current view, deduplicated
    pub fn visible_loaders(&mut self) -> Result<Vec<Loader>> {
        Ok(self.view()?.loaders().into_iter().cloned().collect())
    }
}

/// Descendants of the collapsed posts a pass read. The pass skipped them,
/// but expanding the parent brings them back with their state.
fn hidden_under_collapsed(
    store: &ContentStore,
    collapse: &CollapseRegistry,
    deps: &Dependencies,
) -> HashSet<LinkKey> {
    let mut hidden = HashSet::new();
    let mut sequences = HashSet::new();
    let mut stack: Vec<Link<Post>> = deps
        .collapse_reads()
        .map(|key| Link::new(key.as_str()))
        .filter(|link| collapse.peek(link).is_some_and(|entry| entry.collapsed))
        .collect();

    while let Some(link) = stack.pop() {
        let Resolution::Value(post) = store.view(&link) else {
            continue;
        };
        let Some(listing) = &post.replies else {
            continue;
        };
        let mut refs: Vec<&ReplyRef> = listing.items.iter().collect();
        let mut loaders: Vec<&Loader> = listing.loader.iter().collect();
        loop {
            if let Some(reply) = refs.pop() {
                match reply {
                    ReplyRef::Known(child) => {
                        if hidden.insert(child.key()) {
                            stack.push(child.clone());
                        }
                    }
                    ReplyRef::Pending(loader) => loaders.push(loader),
                }
            } else if let Some(loader) = loaders.pop() {
                if !sequences.insert(loader.key.key()) {
                    continue;
                }
                if let Resolution::Value(items) = store.view(&loader.key) {
                    refs.extend(items.iter());
                }
            } else {
                break;
            }
        }
    }
    hidden
}
