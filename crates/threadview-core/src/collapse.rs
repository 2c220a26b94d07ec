//! Per-link collapse state
//!
//! Entries are created lazily with a caller-supplied default and keep that
//! default for the life of the registry. The registry is owned by a
//! [`Session`](crate::session::Session), never shared globally.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::error::{Result, ThreadError};
use crate::link::{Link, LinkKey};
use crate::model::Post;

/// UI state of one post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollapseEntry {
    pub collapsed: bool,
    /// Number of hover regions currently over the post's controls
    pub hovering: u32,
}

#[derive(Debug)]
struct Slot {
    entry: CollapseEntry,
    version: u64,
}

/// Table of collapse entries keyed by post link
#[derive(Debug, Default)]
pub struct CollapseRegistry {
    entries: HashMap<LinkKey, Slot>,
    clock: u64,
}

impl CollapseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an entry, creating it with `default` on first touch.
    ///
    /// Reading a missing entry without a default is a programming error and
    /// fails with [`ThreadError::CollapseStateMissing`].
    pub fn get(&mut self, link: &Link<Post>, default: Option<bool>) -> Result<CollapseEntry> {
        let key = link.key();
        if let Some(slot) = self.entries.get(&key) {
            return Ok(slot.entry);
        }
        let Some(collapsed) = default else {
            return Err(missing(link));
        };
        trace!(link = %link, collapsed, "collapse_entry_created");
        let entry = CollapseEntry {
            collapsed,
            hovering: 0,
        };
        self.clock += 1;
        self.entries.insert(
            key,
            Slot {
                entry,
                version: self.clock,
            },
        );
        Ok(entry)
    }

    /// Read an entry without creating it
    pub fn peek(&self, link: &Link<Post>) -> Option<CollapseEntry> {
        self.entries.get(&link.key()).map(|slot| slot.entry)
    }

    /// Set the collapsed flag, creating the entry if needed.
    ///
    /// Returns whether the flag changed.
    pub fn set_collapsed(&mut self, link: &Link<Post>, collapsed: bool) -> bool {
        let current = self.get(link, Some(collapsed));
        if matches!(current, Ok(entry) if entry.collapsed == collapsed) {
            return false;
        }
        self.clock += 1;
        let clock = self.clock;
        if let Some(slot) = self.entries.get_mut(&link.key()) {
            slot.entry.collapsed = collapsed;
            slot.version = clock;
        }
        true
    }

    /// Flip the collapsed flag of an existing entry, returning the new value
    pub fn toggle(&mut self, link: &Link<Post>) -> Result<bool> {
        let entry = self.get(link, None)?;
        self.set_collapsed(link, !entry.collapsed);
        Ok(!entry.collapsed)
    }

    /// Pointer entered one of the post's hover regions
    pub fn hover_enter(&mut self, link: &Link<Post>) -> Result<u32> {
        let slot = self.slot_mut(link)?;
        slot.entry.hovering += 1;
        Ok(slot.entry.hovering)
    }

    /// Pointer left a hover region; the counter never drops below zero
    pub fn hover_leave(&mut self, link: &Link<Post>) -> Result<u32> {
        let slot = self.slot_mut(link)?;
        slot.entry.hovering = slot.entry.hovering.saturating_sub(1);
        Ok(slot.entry.hovering)
    }

    /// Version of an entry; 0 while absent. Hover changes do not advance it.
    pub fn version(&self, key: &LinkKey) -> u64 {
        self.entries.get(key).map_or(0, |slot| slot.version)
    }

    /// Drop entries for which `keep` returns false, returning how many went
    pub fn retain(&mut self, mut keep: impl FnMut(&LinkKey) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot_mut(&mut self, link: &Link<Post>) -> Result<&mut Slot> {
        self.entries.get_mut(&link.key()).ok_or_else(|| missing(link))
    }
}

fn missing(link: &Link<Post>) -> ThreadError {
    ThreadError::CollapseStateMissing {
        id: link.id().to_string(),
    }
}
