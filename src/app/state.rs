//! Application state: everything the event handler reads and writes.
//!
//! [`AppState`] groups the user's current search intent (query, content type,
//! filters) with the components that act on it: the debounce gate, the
//! search orchestrator, the scroll trigger, history and the detail
//! navigator. The host renders from it and never mutates it directly.
//!
//! # Example
//!
//! ```rust
//! use shikimore::app::AppState;
//! use shikimore::domain::ContentType;
//! use shikimore::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! state.query = "naruto".to_string();
//! let params = state.params();
//! assert_eq!(params.content_type, ContentType::Anime);
//! assert_eq!(params.limit, 20);
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::filters::{Filters, GenreCatalog, StudioInput};
use crate::domain::{ContentItem, ContentType, EntityDetail, ItemKey, SearchParams};
use crate::navigation::{DetailNavigator, SearchHistory};
use crate::search::{DebounceGate, InfiniteScrollTrigger, SearchOrchestrator};
use crate::Config;

/// What the detail pane shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailPane {
    #[default]
    Closed,
    Loading(ItemKey),
    Loaded(EntityDetail),
    Failed { key: ItemKey, message: String },
}

/// Central application state container.
#[derive(Debug)]
pub struct AppState {
    /// Text in the search box. May be ahead of the last fired search while
    /// the debounce gate is pending.
    pub query: String,

    pub content_type: ContentType,

    pub filters: Filters,

    pub studio_input: StudioInput,

    /// Page size for every request.
    pub limit: u32,

    pub search: SearchOrchestrator,

    pub debounce: DebounceGate,

    pub scroll: InfiniteScrollTrigger,

    pub history: SearchHistory,

    pub navigator: DetailNavigator,

    pub detail: DetailPane,

    pub genres: GenreCatalog,

    /// Dominant poster colors, keyed per item since ids repeat across types.
    pub accent_colors: HashMap<ItemKey, String>,

    /// Accent color requests in flight.
    pub pending_accents: HashSet<ItemKey>,

    /// Keyboard focus. Tracks an item, not a position, so it survives appends
    /// and sorting.
    pub focused: Option<ItemKey>,

    /// Whether the consuming view is attached.
    pub mounted: bool,
}

impl AppState {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            query: String::new(),
            content_type: ContentType::default(),
            filters: Filters::default(),
            studio_input: StudioInput::default(),
            limit: config.page_limit,
            search: SearchOrchestrator::new(),
            debounce: DebounceGate::new(Duration::from_millis(config.debounce_ms)),
            scroll: InfiniteScrollTrigger::new(config.scroll_threshold),
            history: SearchHistory::new(config.history_capacity),
            navigator: DetailNavigator::new(),
            detail: DetailPane::Closed,
            genres: GenreCatalog::default(),
            accent_colors: HashMap::new(),
            pending_accents: HashSet::new(),
            focused: None,
            mounted: false,
        }
    }

    /// Snapshot of the current search intent.
    #[must_use]
    pub fn params(&self) -> SearchParams {
        let title_filters = self.content_type.supports_title_filters();
        SearchParams {
            query: self.query.clone(),
            content_type: self.content_type,
            kind_filter: self.filters.kind.clone(),
            status_filter: self.filters.status.clone(),
            genre_filter: self
                .filters
                .genre_filter()
                .filter(|_| title_filters),
            studio_filter: self.filters.studio.clone().filter(|_| title_filters),
            sort_by: self.filters.sort,
            limit: self.limit,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.search.state().items
    }

    /// Moves focus by `step` items, clamped to the list.
    ///
    /// With nothing focused (or the focused item gone), focus lands on the
    /// first item.
    pub fn move_focus(&mut self, step: isize) {
        let items = &self.search.state().items;
        if items.is_empty() {
            self.focused = None;
            return;
        }

        let current = self
            .focused
            .and_then(|key| items.iter().position(|item| item.key() == key));

        let next = match current {
            Some(index) => index.saturating_add_signed(step).min(items.len() - 1),
            None => 0,
        };
        self.focused = Some(items[next].key());
    }

    #[must_use]
    pub fn focused_item(&self) -> Option<&ContentItem> {
        let key = self.focused?;
        self.items().iter().find(|item| item.key() == key)
    }

    #[must_use]
    pub fn accent_color(&self, key: ItemKey) -> Option<&str> {
        self.accent_colors.get(&key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Anime, ContentItem};

    fn anime(id: u64) -> ContentItem {
        ContentItem::Anime(Anime {
            id,
            title: format!("A{id}"),
            russian: None,
            url: None,
            poster_url: None,
            score: None,
            kind: None,
            status: None,
            episodes: Some(1),
            episodes_aired: None,
        })
    }

    fn with_items(ids: std::ops::Range<u64>) -> AppState {
        let mut state = AppState::new(&Config::default());
        state.query = "a".to_string();
        let request = state.search.search(state.params(), true).unwrap();
        state.search.complete(&request, Ok(ids.map(anime).collect()));
        state
    }

    #[test]
    fn focus_clamps_at_both_ends() {
        let mut state = with_items(0..3);
        state.move_focus(-1);
        assert_eq!(state.focused, Some(ItemKey::new(ContentType::Anime, 0)));
        state.move_focus(-1);
        assert_eq!(state.focused, Some(ItemKey::new(ContentType::Anime, 0)));

        state.move_focus(1);
        state.move_focus(1);
        state.move_focus(1);
        assert_eq!(state.focused, Some(ItemKey::new(ContentType::Anime, 2)));
    }

    #[test]
    fn focus_on_empty_list_is_none() {
        let mut state = AppState::new(&Config::default());
        state.move_focus(1);
        assert_eq!(state.focused, None);
    }

    #[test]
    fn title_filters_are_dropped_for_characters() {
        let mut state = AppState::new(&Config::default());
        state.filters.genres = vec![1, 2];
        state.filters.studio = Some("Bones".to_string());
        assert_eq!(state.params().genre_filter.as_deref(), Some("1,2"));

        state.content_type = ContentType::Characters;
        let params = state.params();
        assert_eq!(params.genre_filter, None);
        assert_eq!(params.studio_filter, None);
    }
}
