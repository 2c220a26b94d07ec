//! Opaque typed links into the content store
//!
//! A [`Link<T>`] names a value of type `T` that may or may not have been
//! fetched yet. Links carry no data; two links are equal when their ids are.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Untyped identity of a link, used as the key of store and registry tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(Arc<str>);

impl LinkKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed handle to a value in the content store
pub struct Link<T> {
    id: Arc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Link<T> {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Link {
            id: id.into(),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> LinkKey {
        LinkKey(Arc::clone(&self.id))
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Link {
            id: Arc::clone(&self.id),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Link<T> {}

impl<T> Hash for Link<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.id)
    }
}

impl<T> fmt::Display for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl<T> From<&str> for Link<T> {
    fn from(id: &str) -> Self {
        Link::new(id)
    }
}

impl<T> Serialize for Link<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl<'de, T> Deserialize<'de> for Link<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Link::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_links_compare_by_id() {
        let a: Link<String> = Link::new("a");
        let a2: Link<String> = Link::from("a");
        let b: Link<String> = Link::new("b");
        assert_eq!(a, a2);
        assert_ne!(a, b);

        let set: HashSet<Link<String>> = [a.clone(), a2, b].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a.key().as_str(), "a");
    }

    #[test]
    fn test_link_serializes_as_plain_string() {
        let link: Link<u32> = Link::new("t3_abc");
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, "\"t3_abc\"");

        let back: Link<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, link);
    }
}
