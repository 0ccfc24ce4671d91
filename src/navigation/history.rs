//! Recent search queries, most recent first.

use crate::domain::{Result, ShikimoreError};

/// Key under which the history is persisted.
pub const HISTORY_KEY: &str = "search_history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
    capacity: usize,
}

impl SearchHistory {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Restores a previously persisted history.
    ///
    /// A missing or malformed value yields an empty history.
    #[must_use]
    pub fn from_stored(raw: Option<&str>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        let Some(raw) = raw else {
            return history;
        };

        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(mut entries) => {
                entries.truncate(capacity);
                history.entries = entries;
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed search history");
            }
        }
        history
    }

    /// Moves `query` to the front. Blank queries are ignored.
    ///
    /// Returns whether the history changed and should be persisted.
    ///
    /// # Examples
    ///
    /// ```
    /// use shikimore::navigation::SearchHistory;
    ///
    /// let mut history = SearchHistory::new(10);
    /// history.add("naruto");
    /// history.add("bleach");
    /// history.add("naruto");
    /// assert_eq!(history.entries(), ["naruto", "bleach"]);
    /// ```
    pub fn add(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }
        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized form written to the store.
    ///
    /// # Errors
    ///
    /// Returns [`ShikimoreError::Storage`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.entries).map_err(|e| ShikimoreError::Storage(e.to_string()))
    }
}
