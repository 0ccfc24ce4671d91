//! Key-value store abstraction.
//!
//! The engine persists exactly two string values (the last query and the
//! search history). The [`KeyValueStore`] trait keeps the host free to choose
//! where they live; values are opaque strings so callers own their encoding.

use crate::domain::error::Result;

/// Abstraction over persistent string storage.
///
/// # Implementations
///
/// - [`JsonStore`](crate::storage::JsonStore): single JSON file with atomic writes
/// - [`MemoryStore`](crate::storage::MemoryStore): in-process map for tests and
///   ephemeral sessions
///
/// # Examples
///
/// ```
/// use shikimore::storage::{KeyValueStore, MemoryStore};
///
/// let mut store = MemoryStore::default();
/// store.set("last_search", "naruto")?;
/// assert_eq!(store.get("last_search")?.as_deref(), Some("naruto"));
/// store.remove("last_search")?;
/// assert_eq!(store.get("last_search")?, None);
/// # Ok::<(), shikimore::ShikimoreError>(())
/// ```
pub trait KeyValueStore: Send {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<()>;
}
