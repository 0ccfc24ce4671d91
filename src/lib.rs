//! Shikimore: search and pagination engine for an anime/manga catalog client.
//!
//! The crate turns a stream of user intent (typing, filter changes, scrolling,
//! opening detail records) into backend queries, and guarantees that what is
//! shown always belongs to the most recent search:
//!
//! - Debounced query input with cancellable, token-checked timers
//! - Paged search with infinite scroll and explicit load-more
//! - Stale-response discarding by query key and search generation
//! - Client-side sorting of each fetched page
//! - Bounded, persisted search history and last-query restore
//! - Back-navigation across nested detail records
//! - Genre, studio and publisher filters with suggestion lookups

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Console Host (main.rs)                             │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (runtime/)                                 │  ← Executes actions
//! │  - Event channel, timers, backend futures           │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, filters, focus, detail pane      │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Search        │   │ Navigation    │   │ Backend       │
//! │ (search/)     │   │ (navigation/) │   │ (backend/)    │
//! │ - Debounce    │   │ - History     │   │ - Contract    │
//! │ - Orchestrator│   │ - Detail stack│   │ - Fixtures    │
//! │ - Scroll      │   │               │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, Storage & Infrastructure                   │
//! │  - Content types, params, errors (domain/)          │
//! │  - Key-value persistence (storage/)                 │
//! │  - Data paths (infrastructure/)                     │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # $SHIKIMORE_CONFIG
//! debounce_ms = 400
//! page_limit = 20
//! history_capacity = 10
//! scroll_threshold = 0.8
//! data_dir = "~/.local/share/shikimore"
//! fixtures = "fixtures/catalog.json"
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use shikimore::app::{handle_event, Action, Event};
//! use shikimore::storage::MemoryStore;
//! use shikimore::{initialize, Config};
//!
//! let store = MemoryStore::new();
//! let mut state = initialize(&Config::default(), &store);
//!
//! handle_event(&mut state, &Event::QueryChanged("naruto".into()))?;
//! let (_, actions) = handle_event(&mut state, &Event::CommitQuery)?;
//! assert!(actions.iter().any(|a| matches!(a, Action::Fetch(_))));
//! # Ok::<(), shikimore::ShikimoreError>(())
//! ```

pub mod app;
pub mod backend;
pub mod domain;
pub mod infrastructure;
pub mod navigation;
pub mod observability;
pub mod runtime;
pub mod search;
pub mod storage;

pub use app::{handle_event, Action, AppState, Event};
pub use domain::{Result, ShikimoreError};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::backend::MAX_LIMIT;
use crate::navigation::{SearchHistory, HISTORY_KEY};
use crate::storage::{KeyValueStore, LAST_SEARCH_KEY};

const DEFAULT_DEBOUNCE_MS: u64 = 400;
const DEFAULT_PAGE_LIMIT: u32 = 20;
const DEFAULT_HISTORY_CAPACITY: usize = 10;
const DEFAULT_SCROLL_THRESHOLD: f64 = 0.8;

/// Runtime configuration.
///
/// Built from a string map ([`Config::from_map`]) or a TOML file
/// ([`Config::from_file`]). Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period after the last keystroke before a search fires.
    /// Default: 400
    pub debounce_ms: u64,

    /// Page size for every search request, 1..=50. Default: 20
    pub page_limit: u32,

    /// Maximum number of remembered queries. Default: 10
    pub history_capacity: usize,

    /// Fraction of the scrollable content at which load-more triggers,
    /// in (0, 1]. Default: 0.8
    pub scroll_threshold: f64,

    /// Where the key-value store and trace file live.
    pub data_dir: PathBuf,

    /// JSON catalog for the offline backend.
    pub fixtures: Option<PathBuf>,

    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            data_dir: infrastructure::get_data_dir(),
            fixtures: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string map.
    ///
    /// Unknown keys are ignored. Values that fail to parse or validate fall
    /// back to their defaults. Paths support a leading `~`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use shikimore::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_limit".to_string(), "30".to_string());
    /// map.insert("debounce_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.page_limit, 30);
    /// assert_eq!(config.debounce_ms, 400);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let page_limit = parse_or(config, "page_limit", defaults.page_limit)
            .filter(|limit| (1..=MAX_LIMIT).contains(limit));
        let scroll_threshold = parse_or(config, "scroll_threshold", defaults.scroll_threshold)
            .filter(|t| valid_threshold(*t));

        Self {
            debounce_ms: parse_or(config, "debounce_ms", defaults.debounce_ms)
                .unwrap_or(defaults.debounce_ms),
            page_limit: page_limit.unwrap_or(defaults.page_limit),
            history_capacity: parse_or(config, "history_capacity", defaults.history_capacity)
                .unwrap_or(defaults.history_capacity),
            scroll_threshold: scroll_threshold.unwrap_or(defaults.scroll_threshold),
            data_dir: config
                .get("data_dir")
                .map_or(defaults.data_dir, |dir| PathBuf::from(infrastructure::expand_tilde(dir))),
            fixtures: config
                .get("fixtures")
                .map(|path| PathBuf::from(infrastructure::expand_tilde(path))),
            trace_level: config.get("trace_level").cloned(),
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`Config::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| ShikimoreError::Config(format!("Failed to parse config TOML: {e}")))?;

        config.data_dir = expand_path(&config.data_dir);
        config.fixtures = config.fixtures.as_deref().map(expand_path);

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ShikimoreError::Config`] for a page limit outside 1..=50 or a
    /// scroll threshold outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LIMIT).contains(&self.page_limit) {
            return Err(ShikimoreError::Config(format!(
                "page_limit must be between 1 and {MAX_LIMIT}, got {}",
                self.page_limit
            )));
        }
        if !valid_threshold(self.scroll_threshold) {
            return Err(ShikimoreError::Config(format!(
                "scroll_threshold must be in (0, 1], got {}",
                self.scroll_threshold
            )));
        }
        Ok(())
    }
}

fn parse_or<T>(config: &BTreeMap<String, String>, key: &str, default: T) -> Option<T>
where
    T: std::str::FromStr + std::fmt::Debug,
{
    let Some(raw) = config.get(key) else {
        return Some(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(key, value = %raw, ?default, "invalid config value, using default");
            None
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    path.to_str().map_or_else(
        || path.to_path_buf(),
        |s| PathBuf::from(infrastructure::expand_tilde(s)),
    )
}

fn valid_threshold(threshold: f64) -> bool {
    threshold > 0.0 && threshold <= 1.0
}

/// Builds the initial application state.
///
/// Restores the last query into the search box and the search history from
/// `store`. No search is fired here; a restored query is searched once the
/// view mounts. Store failures are logged and ignored.
///
/// # Example
///
/// ```rust
/// use shikimore::storage::{KeyValueStore, MemoryStore, LAST_SEARCH_KEY};
/// use shikimore::{initialize, Config};
///
/// let mut store = MemoryStore::new();
/// store.set(LAST_SEARCH_KEY, "monster")?;
///
/// let state = initialize(&Config::default(), &store);
/// assert_eq!(state.query, "monster");
/// assert!(state.items().is_empty());
/// # Ok::<(), shikimore::ShikimoreError>(())
/// ```
pub fn initialize<S: KeyValueStore + ?Sized>(config: &Config, store: &S) -> AppState {
    tracing::debug!("initializing shikimore");

    let mut state = AppState::new(config);

    match store.get(LAST_SEARCH_KEY) {
        Ok(Some(query)) => state.query = query,
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "failed to restore last search"),
    }

    let stored_history = store.get(HISTORY_KEY).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "failed to restore search history");
        None
    });
    state.history = SearchHistory::from_stored(stored_history.as_deref(), config.history_capacity);

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::io::Write;

    #[test]
    fn map_values_fall_back_individually() {
        let map: BTreeMap<String, String> = [
            ("page_limit", "500"),
            ("scroll_threshold", "0.5"),
            ("history_capacity", "3"),
            ("fixtures", "/tmp/catalog.json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert!((config.scroll_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.history_capacity, 3);
        assert_eq!(config.fixtures, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn toml_file_with_partial_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 250\ntrace_level = \"debug\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn toml_file_out_of_range_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scroll_threshold = 1.5").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ShikimoreError::Config(_))
        ));
    }

    #[test]
    fn initialize_restores_history_and_tolerates_garbage() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "[\"a\",\"b\"]").unwrap();
        let state = initialize(&Config::default(), &store);
        assert_eq!(state.history.entries(), ["a", "b"]);
        assert!(state.query.is_empty());

        store.set(HISTORY_KEY, "not json").unwrap();
        let state = initialize(&Config::default(), &store);
        assert!(state.history.is_empty());
    }
}
