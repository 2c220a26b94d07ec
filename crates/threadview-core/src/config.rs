//! Configuration for threadview
//!
//! Stored in `threadview.toml`. Every section and key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreadError};
use crate::flatten::{FlattenOptions, DEFAULT_TITLE_SEPARATOR};

pub const CONFIG_FILE: &str = "threadview.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub collapse: CollapseConfig,
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Allow single-reply chains to be drawn as one continuous line
    pub threading: bool,
    pub title_separator: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            threading: true,
            title_separator: DEFAULT_TITLE_SEPARATOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Drop collapse entries the latest view neither read nor hid under a
    /// collapsed post
    pub evict_unreachable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rounds of visible loaders the CLI expands before printing
    pub max_rounds: u32,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ThreadError::io_operation("read", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ThreadError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| ThreadError::io_operation("write", path.display(), e))?;
        Ok(())
    }

    /// Path of the config file in `dir`, if there is one
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load `dir/threadview.toml`, or defaults when it does not exist
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "config_found");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            threading: self.render.threading,
            title_separator: self.render.title_separator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.render.threading);
        assert_eq!(config.render.title_separator, " | ");
        assert!(!config.collapse.evict_unreachable);
        assert_eq!(config.loader.max_rounds, 0);
        assert_eq!(config.flatten_options(), FlattenOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.render.threading = false;
        config.loader.max_rounds = 3;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[render]\ntitle_separator = \" / \"\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.render.title_separator, " / ");
        assert!(config.render.threading);
        assert!(!config.collapse.evict_unreachable);
    }

    #[test]
    fn test_discover_without_file_is_default() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::discover(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[render\nthreading = ").unwrap();
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ThreadError::Toml(_)
        ));
    }
}
