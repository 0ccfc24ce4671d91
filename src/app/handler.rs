//! Event handling and state transition logic.
//!
//! [`handle_event`] is the only entry point that mutates [`AppState`]. It
//! receives user intent and asynchronous completions alike, updates state
//! synchronously, and returns whether the view should re-render plus the
//! actions the runtime must execute.
//!
//! # Event Types
//!
//! - **Query input**: `QueryChanged`, `CommitQuery`, `ClearQuery`,
//!   `HistorySelected`, `ClearHistory`
//! - **Filters**: `ContentTypeSelected`, `KindFilterChanged`,
//!   `StatusFilterChanged`, `SortChanged`, `GenreToggled`, `GenresCleared`,
//!   `StudioInputChanged`, `StudioSelected`, `StudioCommitted`, `FiltersReset`
//! - **Results**: `Scrolled`, `LoadMoreRequested`, `Retry`, `FocusNext`,
//!   `FocusPrevious`, `PosterLoaded`
//! - **Detail**: `OpenDetail`, `Back`, `SearchByGenre`, `SearchByStudio`
//! - **Completions**: `DebounceElapsed`, `SearchCompleted`, `DetailLoaded`,
//!   `GenresLoaded`, `SuggestionsLoaded`, `AccentColorResolved`
//! - **Lifecycle**: `Mounted`, `Unmounted`, `Quit`
//!
//! # Example
//!
//! ```rust
//! use shikimore::app::{handle_event, Action, AppState, Event};
//! use shikimore::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! let (render, actions) = handle_event(&mut state, &Event::QueryChanged("naruto".into()))?;
//! assert!(render);
//! assert!(matches!(actions[0], Action::ScheduleTimer { .. }));
//! # Ok::<(), shikimore::ShikimoreError>(())
//! ```

use crate::app::state::DetailPane;
use crate::app::{Action, AppState, Filters, StudioInput};
use crate::domain::error::Result;
use crate::domain::{
    ApiResult, ContentItem, ContentType, EntityDetail, Genre, ItemKey, SortOption, Suggestion,
};
use crate::navigation::HISTORY_KEY;
use crate::search::{Completion, LoadMoreContext, ScrollMetrics, SearchRequest, TimerToken};
use crate::storage::LAST_SEARCH_KEY;

/// Everything that can happen to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The consuming view attached.
    Mounted,
    /// The consuming view went away. Pending timers are cancelled.
    Unmounted,

    /// The search box text changed.
    QueryChanged(String),
    /// Enter: search now.
    CommitQuery,
    /// Escape: empty the box and the results without searching.
    ClearQuery,
    /// A history entry was picked.
    HistorySelected(String),
    ClearHistory,

    ContentTypeSelected(ContentType),
    KindFilterChanged(Option<String>),
    StatusFilterChanged(Option<String>),
    SortChanged(SortOption),
    GenreToggled(u64),
    GenresCleared,
    /// The studio/publisher box text changed.
    StudioInputChanged(String),
    /// A studio/publisher suggestion was picked.
    StudioSelected(Suggestion),
    /// The studio/publisher box was submitted as typed.
    StudioCommitted,
    /// Every filter back to its default.
    FiltersReset,

    Scrolled(ScrollMetrics),
    /// Explicit "load more" control.
    LoadMoreRequested,
    Retry,
    FocusNext,
    FocusPrevious,
    /// A card's poster finished loading.
    PosterLoaded { key: ItemKey, url: String },

    /// Open an entity in the detail pane, from the list or from another
    /// detail record.
    OpenDetail(ItemKey),
    Back,
    /// Genre chip in a detail record.
    SearchByGenre(u64),
    /// Studio or publisher link in a detail record.
    SearchByStudio(Suggestion),

    DebounceElapsed(TimerToken),
    SearchCompleted {
        request: SearchRequest,
        outcome: ApiResult<Vec<ContentItem>>,
    },
    DetailLoaded {
        key: ItemKey,
        outcome: ApiResult<EntityDetail>,
    },
    GenresLoaded(ApiResult<Vec<Genre>>),
    SuggestionsLoaded {
        input: String,
        outcome: ApiResult<Vec<Suggestion>>,
    },
    AccentColorResolved {
        key: ItemKey,
        outcome: ApiResult<String>,
    },

    Quit,
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// # Returns
///
/// `(should_render, actions)`. Actions must be executed in order.
///
/// # Errors
///
/// Returns an error if a value that must be persisted cannot be serialized.
///
/// # Tracing
///
/// Each call runs inside a debug-level `handle_event` span carrying the event.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    let mut actions = Vec::new();

    let render = match event {
        Event::Mounted => {
            state.mounted = true;
            state.scroll.attach();
            if !state.genres.is_loaded() {
                actions.push(Action::LoadGenres);
            }
            // A query restored from the store searches once the view is up.
            if !state.query.trim().is_empty()
                && state.search.last_params().is_none()
                && !state.debounce.is_pending()
            {
                arm_debounce(state, &mut actions);
            }
            true
        }
        Event::Unmounted => {
            state.mounted = false;
            state.scroll.detach();
            cancel_debounce(state, &mut actions);
            false
        }

        Event::QueryChanged(query) => {
            tracing::trace!(query = %query, "query changed");
            state.query.clone_from(query);
            arm_debounce(state, &mut actions);
            true
        }
        Event::CommitQuery => {
            cancel_debounce(state, &mut actions);
            fire_new_search(state, &mut actions)?;
            true
        }
        Event::ClearQuery => {
            cancel_debounce(state, &mut actions);
            state.query.clear();
            state.focused = None;
            state.search.show_empty(state.params());
            true
        }
        Event::HistorySelected(query) => {
            state.query.clone_from(query);
            cancel_debounce(state, &mut actions);
            fire_new_search(state, &mut actions)?;
            true
        }
        Event::ClearHistory => {
            state.history.clear();
            actions.push(Action::Remove { key: HISTORY_KEY });
            true
        }

        Event::ContentTypeSelected(content_type) => {
            if *content_type == state.content_type {
                return Ok((false, actions));
            }
            tracing::debug!(from = %state.content_type, to = %content_type, "content type switched");
            switch_content_type(state, *content_type);
            cancel_debounce(state, &mut actions);
            fire_new_search(state, &mut actions)?;
            true
        }
        Event::KindFilterChanged(kind) => {
            state.filters.kind = kind.clone().filter(|k| !k.is_empty());
            filters_changed(state, &mut actions);
            true
        }
        Event::StatusFilterChanged(status) => {
            state.filters.status = status.clone().filter(|s| !s.is_empty());
            filters_changed(state, &mut actions);
            true
        }
        Event::SortChanged(sort) => {
            state.filters.sort = *sort;
            filters_changed(state, &mut actions);
            true
        }
        Event::GenreToggled(id) => {
            if !state.content_type.supports_title_filters() {
                tracing::debug!(content_type = %state.content_type, "genre filter not applicable");
                return Ok((false, actions));
            }
            state.filters.toggle_genre(*id);
            filters_changed(state, &mut actions);
            true
        }
        Event::GenresCleared => {
            if state.filters.genres.is_empty() {
                return Ok((false, actions));
            }
            state.filters.genres.clear();
            filters_changed(state, &mut actions);
            true
        }
        Event::StudioInputChanged(text) => {
            state.studio_input.text.clone_from(text);
            let trimmed = text.trim();
            if state.content_type.supports_title_filters()
                && trimmed.chars().count() >= StudioInput::MIN_CHARS
            {
                state.studio_input.requested = Some(trimmed.to_string());
                actions.push(Action::FetchSuggestions {
                    content_type: state.content_type,
                    input: trimmed.to_string(),
                });
            } else {
                state.studio_input.requested = None;
                state.studio_input.suggestions.clear();
            }
            true
        }
        Event::StudioSelected(suggestion) => {
            state.filters.studio = Some(suggestion.id.to_string());
            state.studio_input.text.clone_from(&suggestion.name);
            state.studio_input.requested = None;
            state.studio_input.suggestions.clear();
            filters_changed(state, &mut actions);
            true
        }
        Event::StudioCommitted => {
            let typed = state.studio_input.text.trim();
            state.filters.studio = (!typed.is_empty()).then(|| typed.to_string());
            state.studio_input.requested = None;
            state.studio_input.suggestions.clear();
            filters_changed(state, &mut actions);
            true
        }
        Event::FiltersReset => {
            state.filters = Filters::default();
            state.studio_input.clear();
            filters_changed(state, &mut actions);
            true
        }

        Event::Scrolled(metrics) => {
            let context = LoadMoreContext::new(state.search.state(), &state.params());
            if state.scroll.observe(metrics, &context) {
                load_more(state, &mut actions);
                true
            } else {
                false
            }
        }
        Event::LoadMoreRequested => {
            let context = LoadMoreContext::new(state.search.state(), &state.params());
            if context.allows_load_more() {
                load_more(state, &mut actions);
                true
            } else {
                tracing::debug!(?context, "load more not allowed");
                false
            }
        }
        Event::Retry => {
            if let Some(request) = state.search.retry() {
                tracing::debug!(mode = ?request.mode, page = request.page, "retrying");
                actions.push(Action::Fetch(request));
            }
            true
        }
        Event::FocusNext => {
            state.move_focus(1);
            true
        }
        Event::FocusPrevious => {
            state.move_focus(-1);
            true
        }
        Event::PosterLoaded { key, url } => {
            request_accent(state, *key, url, &mut actions);
            false
        }

        Event::OpenDetail(key) => {
            let frame = state.navigator.open(*key);
            show_frame(state, frame, &mut actions);
            true
        }
        Event::Back => {
            match state.navigator.back() {
                Some(frame) => show_frame(state, frame, &mut actions),
                None => state.detail = DetailPane::Closed,
            }
            true
        }
        Event::SearchByGenre(id) => {
            let target = detail_title_type(state);
            close_detail(state);
            if target != state.content_type {
                switch_content_type(state, target);
            }
            state.filters.genres = vec![*id];
            state.search.reset_results();
            cancel_debounce(state, &mut actions);
            fire_new_search(state, &mut actions)?;
            true
        }
        Event::SearchByStudio(suggestion) => {
            let target = detail_title_type(state);
            close_detail(state);
            if target != state.content_type {
                switch_content_type(state, target);
            }
            state.filters.studio = Some(suggestion.id.to_string());
            state.studio_input.text.clone_from(&suggestion.name);
            state.search.reset_results();
            cancel_debounce(state, &mut actions);
            fire_new_search(state, &mut actions)?;
            true
        }

        Event::DebounceElapsed(token) => {
            if state.debounce.elapsed(*token).is_none() {
                return Ok((false, actions));
            }
            fire_new_search(state, &mut actions)?;
            true
        }
        Event::SearchCompleted { request, outcome } => {
            match state.search.complete(request, outcome.clone()) {
                Completion::Discarded => false,
                Completion::Merged { .. } | Completion::Failed { .. } => {
                    if state.focused_item().is_none() {
                        state.focused = None;
                    }
                    true
                }
            }
        }
        Event::DetailLoaded { key, outcome } => {
            if state.navigator.current() != Some(*key) {
                tracing::debug!(?key, "discarding detail for a frame no longer shown");
                return Ok((false, actions));
            }
            match outcome {
                Ok(detail) => {
                    if let Some(url) = detail.poster_url() {
                        request_accent(state, *key, url, &mut actions);
                    }
                    state.detail = DetailPane::Loaded(detail.clone());
                }
                Err(err) => {
                    tracing::debug!(?key, error = %err, "detail fetch failed");
                    state.detail = DetailPane::Failed {
                        key: *key,
                        message: err.user_message(),
                    };
                }
            }
            true
        }
        Event::GenresLoaded(outcome) => match outcome {
            Ok(genres) => {
                tracing::debug!(count = genres.len(), "genre catalog loaded");
                state.genres.load(genres.clone());
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "genre prefetch failed, ignoring");
                false
            }
        },
        Event::SuggestionsLoaded { input, outcome } => {
            if state.studio_input.requested.as_deref() != Some(input.as_str()) {
                tracing::trace!(input = %input, "discarding suggestions for superseded input");
                return Ok((false, actions));
            }
            match outcome {
                Ok(suggestions) => {
                    state.studio_input.suggestions.clone_from(suggestions);
                    true
                }
                Err(err) => {
                    tracing::debug!(error = %err, "suggestion lookup failed, ignoring");
                    false
                }
            }
        }
        Event::AccentColorResolved { key, outcome } => {
            state.pending_accents.remove(key);
            match outcome {
                Ok(color) => {
                    state.accent_colors.insert(*key, color.clone());
                    true
                }
                Err(err) => {
                    tracing::trace!(?key, error = %err, "accent color unavailable");
                    false
                }
            }
        }

        Event::Quit => {
            cancel_debounce(state, &mut actions);
            actions.push(Action::Quit);
            false
        }
    };

    Ok((render, actions))
}

/// Starts a new search from the current state.
///
/// A non-empty query is recorded in history and remembered as the last
/// search.
fn fire_new_search(state: &mut AppState, actions: &mut Vec<Action>) -> Result<()> {
    let params = state.params();
    state.focused = None;

    if params.has_query() {
        if state.history.add(&params.query) {
            actions.push(Action::Persist {
                key: HISTORY_KEY,
                value: state.history.to_json()?,
            });
        }
        actions.push(Action::Persist {
            key: LAST_SEARCH_KEY,
            value: params.query.clone(),
        });
    }

    if let Some(request) = state.search.search(params, true) {
        actions.push(Action::Fetch(request));
    }
    Ok(())
}

fn load_more(state: &mut AppState, actions: &mut Vec<Action>) {
    if let Some(request) = state.search.search(state.params(), false) {
        actions.push(Action::Fetch(request));
    }
}

fn arm_debounce(state: &mut AppState, actions: &mut Vec<Action>) {
    let schedule = state.debounce.trigger(state.query.clone());
    if let Some(previous) = schedule.cancel {
        actions.push(Action::CancelTimer(previous));
    }
    actions.push(Action::ScheduleTimer {
        token: schedule.token,
        delay: schedule.delay,
    });
}

fn cancel_debounce(state: &mut AppState, actions: &mut Vec<Action>) {
    if let Some(token) = state.debounce.cancel() {
        actions.push(Action::CancelTimer(token));
    }
}

/// Resets results in one step, then waits for input to settle before
/// searching with the new filters.
fn filters_changed(state: &mut AppState, actions: &mut Vec<Action>) {
    state.focused = None;
    state.search.reset_results();
    arm_debounce(state, actions);
}

fn switch_content_type(state: &mut AppState, content_type: ContentType) {
    state.content_type = content_type;
    state.filters.reset_type_specific();
    state.studio_input.clear();
    close_detail(state);
}

fn close_detail(state: &mut AppState) {
    state.navigator.clear();
    state.detail = DetailPane::Closed;
}

/// Content type a detail-pane search should run against: the type of the
/// record being shown if it has title filters, else the current tab.
fn detail_title_type(state: &AppState) -> ContentType {
    state
        .navigator
        .current()
        .map(|frame| frame.content_type)
        .filter(|content_type| content_type.supports_title_filters())
        .unwrap_or(state.content_type)
}

fn show_frame(state: &mut AppState, frame: ItemKey, actions: &mut Vec<Action>) {
    if frame.content_type.has_detail() {
        state.detail = DetailPane::Loading(frame);
        actions.push(Action::FetchDetail(frame));
    } else {
        state.detail = DetailPane::Failed {
            key: frame,
            message: format!("No detail page for {}", frame.content_type),
        };
    }
}

fn request_accent(state: &mut AppState, key: ItemKey, url: &str, actions: &mut Vec<Action>) {
    if state.accent_colors.contains_key(&key) || !state.pending_accents.insert(key) {
        return;
    }
    actions.push(Action::FetchAccentColor {
        key,
        url: url.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Anime, ApiError};
    use crate::search::FetchMode;
    use crate::Config;

    fn state() -> AppState {
        let mut state = AppState::new(&Config::default());
        handle_event(&mut state, &Event::Mounted).unwrap();
        state
    }

    fn anime(id: u64) -> ContentItem {
        ContentItem::Anime(Anime {
            id,
            title: format!("A{id}"),
            russian: None,
            url: None,
            poster_url: Some(format!("{id}.jpg")),
            score: None,
            kind: None,
            status: None,
            episodes: Some(1),
            episodes_aired: None,
        })
    }

    fn fetched(actions: &[Action]) -> Vec<&SearchRequest> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Fetch(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn scheduled(actions: &[Action]) -> Option<TimerToken> {
        actions.iter().find_map(|action| match action {
            Action::ScheduleTimer { token, .. } => Some(*token),
            _ => None,
        })
    }

    fn run(state: &mut AppState, event: Event) -> Vec<Action> {
        handle_event(state, &event).unwrap().1
    }

    fn complete(state: &mut AppState, request: &SearchRequest, items: Vec<ContentItem>) {
        run(
            state,
            Event::SearchCompleted {
                request: request.clone(),
                outcome: Ok(items),
            },
        );
    }

    #[test]
    fn mount_prefetches_genres_once() {
        let mut state = state();
        assert!(state.scroll.is_attached());
        run(&mut state, Event::GenresLoaded(Ok(vec![])));
        assert!(run(&mut state, Event::Mounted).is_empty());
    }

    #[test]
    fn restored_query_is_searched_after_mount() {
        let mut state = AppState::new(&Config::default());
        state.query = "monster".to_string();

        let actions = run(&mut state, Event::Mounted);
        let token = scheduled(&actions).unwrap();
        assert!(fetched(&actions).is_empty());

        let fired = run(&mut state, Event::DebounceElapsed(token));
        assert_eq!(fetched(&fired)[0].params.query, "monster");

        run(&mut state, Event::Unmounted);
        assert_eq!(scheduled(&run(&mut state, Event::Mounted)), None);
    }

    #[test]
    fn typing_debounces_into_one_search() {
        let mut state = state();
        let first = scheduled(&run(&mut state, Event::QueryChanged("n".into()))).unwrap();
        let actions = run(&mut state, Event::QueryChanged("naruto".into()));
        assert!(actions.contains(&Action::CancelTimer(first)));
        let last = scheduled(&actions).unwrap();

        assert!(run(&mut state, Event::DebounceElapsed(first)).is_empty());

        let actions = run(&mut state, Event::DebounceElapsed(last));
        let requests = fetched(&actions);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].params.query, "naruto");
        assert!(actions.contains(&Action::Persist {
            key: LAST_SEARCH_KEY,
            value: "naruto".into()
        }));
        assert_eq!(state.history.entries(), ["naruto"]);
    }

    #[test]
    fn commit_cancels_pending_timer_and_fires_now() {
        let mut state = state();
        let token = scheduled(&run(&mut state, Event::QueryChanged("bleach".into()))).unwrap();

        let actions = run(&mut state, Event::CommitQuery);
        assert_eq!(actions[0], Action::CancelTimer(token));
        assert_eq!(fetched(&actions).len(), 1);

        assert!(run(&mut state, Event::DebounceElapsed(token)).is_empty());
    }

    #[test]
    fn escape_clears_without_searching() {
        let mut state = state();
        state.content_type = ContentType::Characters;
        run(&mut state, Event::QueryChanged("levi".into()));

        let actions = run(&mut state, Event::ClearQuery);
        assert!(fetched(&actions).is_empty());
        assert!(matches!(actions[0], Action::CancelTimer(_)));
        assert!(state.query.is_empty());
        assert!(state.items().is_empty());
        assert!(!state.search.state().has_more);
    }

    #[test]
    fn unmount_cancels_timer() {
        let mut state = state();
        let token = scheduled(&run(&mut state, Event::QueryChanged("x".into()))).unwrap();
        let actions = run(&mut state, Event::Unmounted);
        assert_eq!(actions, vec![Action::CancelTimer(token)]);
        assert!(!state.scroll.is_attached());
        assert!(run(&mut state, Event::DebounceElapsed(token)).is_empty());
    }

    #[test]
    fn switching_to_characters_searches_with_empty_query() {
        let mut state = state();
        state.filters.kind = Some("tv".into());
        state.navigator.open(ItemKey::new(ContentType::Anime, 1));

        let actions = run(&mut state, Event::ContentTypeSelected(ContentType::Characters));
        let requests = fetched(&actions);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].params.content_type, ContentType::Characters);
        assert_eq!(requests[0].params.query, "");
        assert_eq!(state.filters.kind, None);
        assert!(!state.navigator.is_open());
    }

    #[test]
    fn switching_to_anime_with_empty_query_does_not_fetch() {
        let mut state = state();
        state.content_type = ContentType::Manga;
        let actions = run(&mut state, Event::ContentTypeSelected(ContentType::Anime));
        assert!(fetched(&actions).is_empty());
        assert!(state.items().is_empty());
        assert!(!state.search.state().loading);
    }

    #[test]
    fn filter_change_resets_atomically_and_rearms() {
        let mut state = state();
        state.query = "naruto".into();
        let request = fetched(&run(&mut state, Event::CommitQuery))[0].clone();
        complete(&mut state, &request, (0..20).map(anime).collect());
        let more = fetched(&run(&mut state, Event::LoadMoreRequested))[0].clone();
        assert_eq!(more.page, 2);

        let actions = run(&mut state, Event::KindFilterChanged(Some("movie".into())));
        let search = state.search.state();
        assert!(search.items.is_empty());
        assert_eq!(search.page, 1);
        assert!(search.has_more);
        assert!(!search.loading_more);
        assert!(scheduled(&actions).is_some());

        complete(&mut state, &more, (20..40).map(anime).collect());
        assert!(state.items().is_empty());
        assert!(run(&mut state, Event::LoadMoreRequested).is_empty());
    }

    #[test]
    fn scrolling_loads_the_next_page_once() {
        let mut state = state();
        state.query = "naruto".into();
        let request = fetched(&run(&mut state, Event::CommitQuery))[0].clone();
        complete(&mut state, &request, (0..20).map(anime).collect());

        let near_end = ScrollMetrics {
            offset: 850.0,
            viewport: 100.0,
            content: 1000.0,
            last_item: Some(ItemKey::new(ContentType::Anime, 19)),
        };
        let actions = run(&mut state, Event::Scrolled(near_end));
        let requests = fetched(&actions);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].mode, FetchMode::More);
        assert!(run(&mut state, Event::Scrolled(near_end)).is_empty());

        complete(&mut state, requests[0], (20..25).map(anime).collect());
        assert_eq!(state.items().len(), 25);
        assert!(!state.search.state().has_more);
    }

    #[test]
    fn retry_reissues_failed_search() {
        let mut state = state();
        state.query = "naruto".into();
        let request = fetched(&run(&mut state, Event::CommitQuery))[0].clone();
        run(
            &mut state,
            Event::SearchCompleted {
                request: request.clone(),
                outcome: Err(ApiError::validation("bad")),
            },
        );
        assert_eq!(state.search.state().error.as_deref(), Some("bad"));

        let retried = fetched(&run(&mut state, Event::Retry))[0].clone();
        assert_eq!(retried.params, request.params);
        assert_eq!(retried.mode, FetchMode::New);
    }

    #[test]
    fn history_selection_fires_and_clear_removes() {
        let mut state = state();
        let actions = run(&mut state, Event::HistorySelected("one piece".into()));
        assert_eq!(fetched(&actions)[0].params.query, "one piece");
        assert_eq!(state.query, "one piece");

        let actions = run(&mut state, Event::ClearHistory);
        assert_eq!(actions, vec![Action::Remove { key: HISTORY_KEY }]);
        assert!(state.history.is_empty());
    }

    #[test]
    fn detail_navigation_and_stale_detail_discard() {
        let mut state = state();
        let naruto = ItemKey::new(ContentType::Anime, 20);
        let kakashi = ItemKey::new(ContentType::Characters, 85);

        assert_eq!(run(&mut state, Event::OpenDetail(naruto)), vec![Action::FetchDetail(naruto)]);
        assert_eq!(run(&mut state, Event::OpenDetail(kakashi)), vec![Action::FetchDetail(kakashi)]);

        let (render, _) = handle_event(
            &mut state,
            &Event::DetailLoaded {
                key: naruto,
                outcome: Err(ApiError::not_found("late")),
            },
        )
        .unwrap();
        assert!(!render);
        assert_eq!(state.detail, DetailPane::Loading(kakashi));

        assert_eq!(run(&mut state, Event::Back), vec![Action::FetchDetail(naruto)]);
        assert!(run(&mut state, Event::Back).is_empty());
        assert_eq!(state.detail, DetailPane::Closed);
    }

    #[test]
    fn people_detail_fails_in_pane_only() {
        let mut state = state();
        let person = ItemKey::new(ContentType::People, 3);
        assert!(run(&mut state, Event::OpenDetail(person)).is_empty());
        assert!(matches!(state.detail, DetailPane::Failed { key, .. } if key == person));
        assert_eq!(state.search.state().error, None);
    }

    #[test]
    fn search_by_genre_switches_to_detail_type() {
        let mut state = state();
        state.content_type = ContentType::Characters;
        state.query = "naruto".into();
        state.navigator.open(ItemKey::new(ContentType::Manga, 11));

        let actions = run(&mut state, Event::SearchByGenre(4));
        let request = fetched(&actions)[0];
        assert_eq!(request.params.content_type, ContentType::Manga);
        assert_eq!(request.params.genre_filter.as_deref(), Some("4"));
        assert_eq!(request.params.query, "naruto");
        assert_eq!(state.detail, DetailPane::Closed);
    }

    #[test]
    fn studio_suggestions_need_two_chars_and_drop_stale_results() {
        let mut state = state();
        assert!(run(&mut state, Event::StudioInputChanged("m".into())).is_empty());

        let actions = run(&mut state, Event::StudioInputChanged("ma".into()));
        assert_eq!(
            actions,
            vec![Action::FetchSuggestions {
                content_type: ContentType::Anime,
                input: "ma".into()
            }]
        );
        run(&mut state, Event::StudioInputChanged("mad".into()));

        let madhouse = Suggestion { id: 11, name: "Madhouse".into() };
        run(
            &mut state,
            Event::SuggestionsLoaded {
                input: "ma".into(),
                outcome: Ok(vec![madhouse.clone()]),
            },
        );
        assert!(state.studio_input.suggestions.is_empty());

        run(
            &mut state,
            Event::SuggestionsLoaded {
                input: "mad".into(),
                outcome: Ok(vec![madhouse.clone()]),
            },
        );
        assert_eq!(state.studio_input.suggestions, vec![madhouse.clone()]);

        run(&mut state, Event::StudioSelected(madhouse));
        assert_eq!(state.params().studio_filter.as_deref(), Some("11"));
    }

    #[test]
    fn accent_colors_are_requested_once_per_item() {
        let mut state = state();
        let key = ItemKey::new(ContentType::Anime, 1);
        let poster = Event::PosterLoaded { key, url: "1.jpg".into() };

        assert_eq!(run(&mut state, poster.clone()).len(), 1);
        assert!(run(&mut state, poster.clone()).is_empty());

        run(
            &mut state,
            Event::AccentColorResolved {
                key,
                outcome: Ok("#123456".into()),
            },
        );
        assert_eq!(state.accent_color(key), Some("#123456"));
        assert!(run(&mut state, poster).is_empty());
    }

    #[test]
    fn focus_survives_appends_and_resets_on_new_search() {
        let mut state = state();
        state.query = "a".into();
        let request = fetched(&run(&mut state, Event::CommitQuery))[0].clone();
        complete(&mut state, &request, (0..20).map(anime).collect());

        run(&mut state, Event::FocusNext);
        run(&mut state, Event::FocusNext);
        let focused = state.focused;
        assert_eq!(focused, Some(ItemKey::new(ContentType::Anime, 1)));

        let more = fetched(&run(&mut state, Event::LoadMoreRequested))[0].clone();
        complete(&mut state, &more, (20..22).map(anime).collect());
        assert_eq!(state.focused, focused);

        run(&mut state, Event::CommitQuery);
        assert_eq!(state.focused, None);
    }

    #[test]
    fn quit_cancels_pending_timer() {
        let mut state = state();
        let token = scheduled(&run(&mut state, Event::QueryChanged("x".into()))).unwrap();
        assert_eq!(
            run(&mut state, Event::Quit),
            vec![Action::CancelTimer(token), Action::Quit]
        );
    }

    #[test]
    fn stale_search_completion_does_not_render() {
        let mut state = state();
        state.query = "a".into();
        let stale = fetched(&run(&mut state, Event::CommitQuery))[0].clone();
        state.query = "b".into();
        run(&mut state, Event::CommitQuery);

        let (render, _) = handle_event(
            &mut state,
            &Event::SearchCompleted {
                request: stale,
                outcome: Ok(vec![anime(1)]),
            },
        )
        .unwrap();
        assert!(!render);
        assert!(state.items().is_empty());
    }
}
