use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Store file name in the cache directory
pub const STORE_FILE: &str = "state.json";

pub const CARS_SEARCH_TERM: &str = "cars_search_term";
pub const OWNERS_SEARCH_TERM: &str = "owners_search_term";

/// Small JSON key/value file for UI state that should survive restarts.
///
/// Every `set` writes the whole file. A missing or unreadable file starts
/// the store empty.
#[derive(Debug)]
pub struct PersistedStore {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl PersistedStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "Opened state store");
        Self { path, values }
    }

    /// Store in `cache_dir`/state.json.
    pub fn in_dir(cache_dir: &Path) -> Self {
        Self::open(cache_dir.join(STORE_FILE))
    }

    fn read(path: &Path) -> Result<BTreeMap<String, serde_json::Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read state file")?;
        serde_json::from_str(&contents).context("Failed to parse state file")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed read. A value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Stored value has unexpected shape");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        if self.values.get(key) == Some(&value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        Ok(())
    }
}
