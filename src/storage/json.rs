//! JSON file-backed key-value store.
//!
//! The whole store is one small JSON document kept in memory and rewritten on
//! every change with an atomic write (write-to-temp + rename), so a crash
//! never leaves a half-written file behind.

use crate::domain::error::{Result, ShikimoreError};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    /// Format version for future migrations.
    version: u32,

    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: 1,
            values: BTreeMap::new(),
        }
    }
}

/// JSON file key-value store.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "values": {
///     "last_search": "naruto",
///     "search_history": "[\"naruto\",\"bleach\"]"
///   }
/// }
/// ```
///
/// A file that cannot be read or parsed is treated as an empty store; the
/// next write replaces it.
pub struct JsonStore {
    file_path: PathBuf,
    data: StoreData,
    dirty: bool,
}

impl JsonStore {
    /// Opens the store at `file_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shikimore::storage::JsonStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonStore::new(PathBuf::from("/tmp/shikimore/store.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening key-value store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "unreadable store, starting empty");
                StoreData::default()
            })
        } else {
            StoreData::default()
        };

        tracing::debug!(keys = data.values.len(), "store opened");

        Ok(Self {
            file_path,
            data,
            dirty: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ShikimoreError::Storage(format!("failed to parse JSON: {e}")))
    }

    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| ShikimoreError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "store saved");
        Ok(())
    }
}

impl KeyValueStore for JsonStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store_set", key = %key).entered();

        if self.data.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.data.values.insert(key.to_string(), value.to_string());
        self.dirty = true;
        self.save_to_file()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store_remove", key = %key).entered();

        if self.data.values.remove(key).is_some() {
            self.dirty = true;
            self.save_to_file()?;
        }
        Ok(())
    }
}

impl Drop for JsonStore {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty store on drop");
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}
