//! Append-only content store
//!
//! Holds resolved values keyed by link id. A link resolves at most once:
//! registering or erroring an id that is already present fails with
//! [`ThreadError::AlreadyResolved`]. Every entry remembers the store
//! generation it was written at, which is what dependency tracking compares.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Result, ThreadError};
use crate::link::{Link, LinkKey};
use crate::model::{Post, ReplySequence};

/// A value held by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Stored {
    Post(Box<Post>),
    Sequence(ReplySequence),
}

impl Stored {
    pub fn kind(&self) -> &'static str {
        match self {
            Stored::Post(_) => "post",
            Stored::Sequence(_) => "sequence",
        }
    }
}

/// Types that can live in the content store
pub trait Storable: Sized {
    const KIND: &'static str;

    fn from_stored(stored: &Stored) -> Option<&Self>;
    fn into_stored(self) -> Stored;
}

impl Storable for Post {
    const KIND: &'static str = "post";

    fn from_stored(stored: &Stored) -> Option<&Self> {
        match stored {
            Stored::Post(post) => Some(post.as_ref()),
            Stored::Sequence(_) => None,
        }
    }

    fn into_stored(self) -> Stored {
        Stored::Post(Box::new(self))
    }
}

impl Storable for ReplySequence {
    const KIND: &'static str = "sequence";

    fn from_stored(stored: &Stored) -> Option<&Self> {
        match stored {
            Stored::Sequence(items) => Some(items),
            Stored::Post(_) => None,
        }
    }

    fn into_stored(self) -> Stored {
        Stored::Sequence(self)
    }
}

/// Outcome of looking a link up
#[derive(Debug, PartialEq)]
pub enum Resolution<'a, T> {
    Value(&'a T),
    /// The link is known but its fetch failed
    Error(String),
    /// Nothing fetched yet
    Unresolved,
}

/// Kind of an entry, for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Post,
    Sequence,
    Error,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Post => "post",
            EntryKind::Sequence => "sequence",
            EntryKind::Error => "error",
        }
    }
}

#[derive(Debug)]
enum Slot {
    Value(Stored),
    Error(String),
}

#[derive(Debug)]
struct Entry {
    slot: Slot,
    version: u64,
}

/// Content store shared by adapters (writers) and the flattener (reader)
#[derive(Debug, Default)]
pub struct ContentStore {
    entries: HashMap<LinkKey, Entry>,
    generation: u64,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a link up
    pub fn view<T: Storable>(&self, link: &Link<T>) -> Resolution<'_, T> {
        let Some(entry) = self.entries.get(&link.key()) else {
            return Resolution::Unresolved;
        };
        match &entry.slot {
            Slot::Error(message) => Resolution::Error(message.clone()),
            Slot::Value(stored) => match T::from_stored(stored) {
                Some(value) => Resolution::Value(value),
                None => Resolution::Error(format!(
                    "link resolved to a {} (expected a {})",
                    stored.kind(),
                    T::KIND
                )),
            },
        }
    }

    /// Version of an entry; 0 while the link is unresolved
    pub fn version(&self, key: &LinkKey) -> u64 {
        self.entries.get(key).map_or(0, |entry| entry.version)
    }

    pub fn contains<T>(&self, link: &Link<T>) -> bool {
        self.entries.contains_key(&link.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a value for a new link
    pub fn register<T: Storable>(&mut self, link: &Link<T>, value: T) -> Result<()> {
        self.write(link.key(), Slot::Value(value.into_stored()))
    }

    /// Permanently mark a link as failed
    pub fn mark_error<T>(&mut self, link: &Link<T>, message: impl Into<String>) -> Result<()> {
        self.write(link.key(), Slot::Error(message.into()))
    }

    /// Entries sorted by id
    pub fn entries(&self) -> Vec<(&LinkKey, EntryKind)> {
        let mut listed: Vec<(&LinkKey, EntryKind)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let kind = match &entry.slot {
                    Slot::Value(Stored::Post(_)) => EntryKind::Post,
                    Slot::Value(Stored::Sequence(_)) => EntryKind::Sequence,
                    Slot::Error(_) => EntryKind::Error,
                };
                (key, kind)
            })
            .collect();
        listed.sort_by(|a, b| a.0.cmp(b.0));
        listed
    }

    fn write(&mut self, key: LinkKey, slot: Slot) -> Result<()> {
        if self.entries.contains_key(&key) {
            return Err(ThreadError::AlreadyResolved {
                id: key.to_string(),
            });
        }
        self.generation += 1;
        trace!(link = %key, generation = self.generation, "store_write");
        self.entries.insert(
            key,
            Entry {
                slot,
                version: self.generation,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostContent, ReplyRef};

    #[test]
    fn test_view_reports_unresolved_then_value() {
        let mut store = ContentStore::new();
        let link: Link<Post> = Link::new("a");
        assert_eq!(store.view(&link), Resolution::Unresolved);
        assert_eq!(store.version(&link.key()), 0);

        store
            .register(&link, Post::new(PostContent::post("hello")))
            .unwrap();
        match store.view(&link) {
            Resolution::Value(post) => assert_eq!(post.content.display_title(), Some("hello")),
            other => panic!("expected value, got {:?}", other),
        }
        assert_eq!(store.version(&link.key()), 1);
    }

    #[test]
    fn test_register_never_overwrites() {
        let mut store = ContentStore::new();
        let link: Link<Post> = Link::new("a");
        store
            .register(&link, Post::new(PostContent::post("first")))
            .unwrap();

        let err = store
            .register(&link, Post::new(PostContent::post("second")))
            .unwrap_err();
        assert!(matches!(err, ThreadError::AlreadyResolved { .. }));
        assert!(store.mark_error(&link, "late failure").is_err());

        match store.view(&link) {
            Resolution::Value(post) => assert_eq!(post.content.display_title(), Some("first")),
            other => panic!("expected first value, got {:?}", other),
        }
    }

    #[test]
    fn test_error_entries_and_type_mismatch() {
        let mut store = ContentStore::new();
        let broken: Link<Post> = Link::new("broken");
        store.mark_error(&broken, "403 forbidden").unwrap();
        assert_eq!(store.view(&broken), Resolution::Error("403 forbidden".into()));

        let seq: Link<ReplySequence> = Link::new("seq");
        store
            .register(&seq, vec![ReplyRef::Known(Link::new("x"))])
            .unwrap();
        let as_post: Link<Post> = Link::new("seq");
        match store.view(&as_post) {
            Resolution::Error(message) => assert!(message.contains("sequence")),
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_entries_are_sorted_by_key() {
        let mut store = ContentStore::new();
        store
            .register(&Link::<Post>::new("b"), Post::new(PostContent::post("b")))
            .unwrap();
        store
            .register(&Link::<ReplySequence>::new("a"), Vec::new())
            .unwrap();
        store.mark_error(&Link::<Post>::new("c"), "gone").unwrap();

        let listed: Vec<(&str, &str)> = store
            .entries()
            .iter()
            .map(|(key, kind)| (key.as_str(), kind.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![("a", "sequence"), ("b", "post"), ("c", "error")]
        );
    }
}
