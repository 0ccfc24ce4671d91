//! Persistence for the few values that outlive a session: the last query and
//! the search history.
//!
//! # Modules
//!
//! - `backend`: the [`KeyValueStore`] trait
//! - `json`: JSON file implementation with atomic writes
//! - `memory`: in-process implementation

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::KeyValueStore;
pub use json::JsonStore;
pub use memory::MemoryStore;

/// Key of the last fired query.
pub const LAST_SEARCH_KEY: &str = "last_search";
