//! Paged result state and the rules for merging backend responses into it.
//!
//! The orchestrator is the single writer of [`SearchState`]. It does not talk
//! to the backend itself: [`SearchOrchestrator::search`] updates the state
//! synchronously and returns the [`SearchRequest`] the host should dispatch,
//! and the host hands the outcome back to [`SearchOrchestrator::complete`].
//!
//! Responses can arrive in any order. Each request captures the query key and
//! the search generation it was issued under, and a response is merged only
//! if both are still current. A new search, an empty-query short-circuit and
//! an atomic reset all bump the generation, so anything issued before them is
//! dropped on arrival, success or failure alike.

use crate::domain::{ApiResult, ContentItem, SearchParams};

use super::query_key::{encode, QueryKey};
use super::sort::sort_page;

/// Whether a request replaces the list or appends to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    New,
    More,
}

/// A backend query the host must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub params: SearchParams,
    /// 1-based. Ignored by the backend for unpaged content types.
    pub page: u32,
    pub mode: FetchMode,
    pub key: QueryKey,
    pub generation: u64,
}

/// Read-only view of the current results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub items: Vec<ContentItem>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub active_key: QueryKey,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            loading_more: false,
            error: None,
            active_key: QueryKey::default(),
        }
    }
}

/// What [`SearchOrchestrator::complete`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Items were merged; `count` is the size of the merged page.
    Merged { mode: FetchMode, count: usize },
    /// The error was surfaced.
    Failed { mode: FetchMode },
    /// The response belonged to a superseded search.
    Discarded,
}

#[derive(Debug, Default)]
pub struct SearchOrchestrator {
    state: SearchState,
    generation: u64,
    last_params: Option<SearchParams>,
    last_failure: Option<FetchMode>,
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    /// Parameters of the most recent new search.
    #[must_use]
    pub const fn last_params(&self) -> Option<&SearchParams> {
        self.last_params.as_ref()
    }

    /// Starts a new search or loads the next page.
    ///
    /// A new search resets the state immediately and always returns a request,
    /// except for a blank query on a type that needs one: then the list is
    /// shown empty with nothing more to load.
    ///
    /// Load-more returns `None` when it cannot run: nothing searched yet, a
    /// fetch already in flight, no more pages, or `params` no longer matching
    /// the active search.
    pub fn search(&mut self, params: SearchParams, is_new_search: bool) -> Option<SearchRequest> {
        if is_new_search {
            self.start_new(params)
        } else {
            self.start_more(params)
        }
    }

    fn start_new(&mut self, params: SearchParams) -> Option<SearchRequest> {
        let key = encode(&params);
        self.generation += 1;
        self.last_failure = None;

        self.state.items.clear();
        self.state.page = 1;
        self.state.error = None;
        self.state.loading_more = false;
        self.state.active_key = key.clone();

        if !params.should_fetch() {
            tracing::debug!(content_type = %params.content_type, "blank query, showing empty results");
            self.state.loading = false;
            self.state.has_more = false;
            self.last_params = Some(params);
            return None;
        }

        self.state.loading = true;
        self.state.has_more = true;
        self.last_params = Some(params.clone());

        tracing::debug!(
            query = %params.query,
            content_type = %params.content_type,
            generation = self.generation,
            "new search dispatched"
        );

        Some(SearchRequest {
            params,
            page: 1,
            mode: FetchMode::New,
            key,
            generation: self.generation,
        })
    }

    fn start_more(&mut self, params: SearchParams) -> Option<SearchRequest> {
        if self.last_params.is_none() {
            tracing::debug!("load more refused: no search yet");
            return None;
        }
        if self.state.loading || self.state.loading_more || !self.state.has_more {
            tracing::debug!(
                loading = self.state.loading,
                loading_more = self.state.loading_more,
                has_more = self.state.has_more,
                "load more refused"
            );
            return None;
        }
        let key = encode(&params);
        if key != self.state.active_key {
            tracing::debug!("load more refused: parameters changed since the last search");
            return None;
        }

        self.state.loading_more = true;
        self.state.error = None;
        self.last_failure = None;

        let page = self.state.page + 1;
        tracing::debug!(page, generation = self.generation, "load more dispatched");

        Some(SearchRequest {
            params,
            page,
            mode: FetchMode::More,
            key,
            generation: self.generation,
        })
    }

    /// Applies the backend's answer to `request`.
    pub fn complete(
        &mut self,
        request: &SearchRequest,
        outcome: ApiResult<Vec<ContentItem>>,
    ) -> Completion {
        if request.generation != self.generation || request.key != self.state.active_key {
            tracing::debug!(
                request_generation = request.generation,
                current_generation = self.generation,
                ok = outcome.is_ok(),
                "discarding stale response"
            );
            return Completion::Discarded;
        }

        match outcome {
            Ok(mut page) => {
                sort_page(&mut page, request.params.sort_by);
                let count = page.len();
                let full_page = u32::try_from(count).is_ok_and(|n| n == request.params.limit);
                self.state.has_more = full_page && request.params.content_type.is_paginated();

                match request.mode {
                    FetchMode::New => {
                        self.state.items = page;
                        self.state.page = 1;
                        self.state.loading = false;
                    }
                    FetchMode::More => {
                        self.state.items.extend(page);
                        self.state.page = request.page;
                        self.state.loading_more = false;
                    }
                }

                tracing::debug!(
                    mode = ?request.mode,
                    count,
                    total = self.state.items.len(),
                    has_more = self.state.has_more,
                    "page merged"
                );
                Completion::Merged {
                    mode: request.mode,
                    count,
                }
            }
            Err(err) => {
                tracing::debug!(mode = ?request.mode, kind = ?err.kind, error = %err, "search failed");
                self.state.error = Some(err.user_message());
                self.last_failure = Some(request.mode);
                match request.mode {
                    FetchMode::New => {
                        self.state.items.clear();
                        self.state.loading = false;
                    }
                    FetchMode::More => {
                        self.state.loading_more = false;
                    }
                }
                Completion::Failed { mode: request.mode }
            }
        }
    }

    /// Repeats whatever failed last.
    ///
    /// After a failed load-more this re-requests the same next page; otherwise
    /// it re-runs the last search from page 1.
    pub fn retry(&mut self) -> Option<SearchRequest> {
        let params = self.last_params.clone()?;
        match self.last_failure {
            Some(FetchMode::More) => self.start_more(params),
            _ => self.start_new(params),
        }
    }

    /// Empties the list and rewinds pagination in one step.
    ///
    /// Anything in flight is invalidated and the active key is cleared, so
    /// load-more refuses until the next new search decides the new key.
    pub fn reset_results(&mut self) {
        self.generation += 1;
        self.state.active_key = QueryKey::default();
        self.last_failure = None;
        self.state.items.clear();
        self.state.page = 1;
        self.state.has_more = true;
        self.state.loading = false;
        self.state.loading_more = false;
        self.state.error = None;
        tracing::debug!(generation = self.generation, "results reset");
    }

    /// Shows an empty list for `params` without searching.
    pub fn show_empty(&mut self, params: SearchParams) {
        self.reset_results();
        self.state.has_more = false;
        self.state.active_key = encode(&params);
        self.last_params = Some(params);
    }
}
