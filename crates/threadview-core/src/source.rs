//! Content sources answer "load more" requests with bundles

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::bundle::ContentBundle;
use crate::error::{Result, ThreadError};
use crate::model::Loader;

/// Something that can fetch the content behind a loader
pub trait ContentSource {
    fn fetch(&self, loader: &Loader) -> Result<ContentBundle>;
}

/// Serves bundles from `<dir>/<loader key>.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }

    /// File that answers `key`; path separators in keys are flattened
    pub fn bundle_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect();
        self.root.join(format!("{}.json", name))
    }
}

impl ContentSource for DirectorySource {
    fn fetch(&self, loader: &Loader) -> Result<ContentBundle> {
        let path = self.bundle_path(loader.key.id());
        if !path.is_file() {
            return Err(ThreadError::not_found("bundle", path.display()));
        }
        debug!(key = %loader.key, path = %path.display(), "fetch_bundle");
        ContentBundle::load(&path)
    }
}

/// In-memory source keyed by loader id
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bundles: HashMap<String, ContentBundle>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, bundle: ContentBundle) -> Self {
        self.bundles.insert(key.into(), bundle);
        self
    }
}

impl ContentSource for MemorySource {
    fn fetch(&self, loader: &Loader) -> Result<ContentBundle> {
        self.bundles
            .get(loader.key.id())
            .cloned()
            .ok_or_else(|| ThreadError::Source {
                key: loader.key.id().to_string(),
                reason: "no bundle registered".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_directory_source_reads_key_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("page2.json"),
            r#"{ "sequences": { "page2": [ { "link": "c9" } ] } }"#,
        )
        .unwrap();

        let source = DirectorySource::new(dir.path());
        let bundle = source.fetch(&Loader::new("page2")).unwrap();
        assert!(bundle.contains("page2"));
    }

    #[test]
    fn test_directory_source_missing_file() {
        let dir = tempdir().unwrap();
        let err = DirectorySource::new(dir.path())
            .fetch(&Loader::new("nope"))
            .unwrap_err();
        assert!(matches!(err, ThreadError::NotFound { .. }));
    }

    #[test]
    fn test_bundle_path_flattens_separators() {
        let source = DirectorySource::new("/data");
        assert_eq!(
            source.bundle_path("t3/abc:more"),
            PathBuf::from("/data/t3_abc_more.json")
        );
    }

    #[test]
    fn test_memory_source_unknown_key() {
        let err = MemorySource::new().fetch(&Loader::new("x")).unwrap_err();
        assert!(matches!(err, ThreadError::Source { .. }));
    }
}
