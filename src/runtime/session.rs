//! A running search session.
//!
//! [`Session`] owns the [`AppState`] and is the only caller of
//! [`handle_event`]. Each event is handled to completion before the next one
//! is taken from the channel, so state is never touched concurrently; the
//! only suspension points are backend awaits and timer sleeps inside spawned
//! tasks.
//!
//! All methods that execute actions spawn tokio tasks and must be called from
//! within a tokio runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shikimore::app::Event;
//! use shikimore::backend::{FixtureBackend, FixtureCatalog};
//! use shikimore::runtime::Session;
//! use shikimore::storage::MemoryStore;
//! use shikimore::Config;
//!
//! # async fn demo() -> shikimore::Result<()> {
//! let backend = FixtureBackend::new(FixtureCatalog::default())?;
//! let mut session = Session::new(&Config::default(), Arc::new(backend), MemoryStore::new());
//! session.dispatch(Event::Mounted)?;
//! session.dispatch(Event::QueryChanged("naruto".into()))?;
//! session.settle().await?;
//! println!("{} results", session.state().items().len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::tasks;
use crate::app::{handle_event, Action, AppState, Event};
use crate::backend::CatalogBackend;
use crate::domain::{Result, ShikimoreError};
use crate::search::TimerToken;
use crate::storage::KeyValueStore;
use crate::{initialize, Config};

pub struct Session<B: CatalogBackend, S: KeyValueStore> {
    state: AppState,
    backend: Arc<B>,
    store: S,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    timers: HashMap<TimerToken, JoinHandle<()>>,
    /// Backend tasks spawned whose completion event has not been handled yet.
    in_flight: usize,
    finished: bool,
}

impl<B: CatalogBackend, S: KeyValueStore> Session<B, S> {
    /// Builds a session, restoring the last query and history from `store`.
    pub fn new(config: &Config, backend: Arc<B>, store: S) -> Self {
        let state = initialize(config, &store);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state,
            backend,
            store,
            events_tx,
            events_rx,
            timers: HashMap::new(),
            in_flight: 0,
            finished: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Whether a `Quit` action has been executed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// True when no timer is pending and no backend request is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.in_flight == 0
    }

    /// Handles one event and executes the resulting actions.
    ///
    /// Returns whether the view should re-render.
    ///
    /// # Errors
    ///
    /// Propagates errors from the event handler. Failures of individual
    /// side effects (a store write, a backend call) are not errors here;
    /// they are logged or come back as events.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        self.account(&event);
        let (render, actions) = handle_event(&mut self.state, &event)?;
        for action in actions {
            self.execute(action);
        }
        Ok(render)
    }

    /// Waits for the next completion or timer event.
    ///
    /// Returns `None` once the session has finished.
    pub async fn next_event(&mut self) -> Option<Event> {
        if self.finished {
            return None;
        }
        self.events_rx.recv().await
    }

    /// Handles completions and timers until nothing is pending.
    ///
    /// # Errors
    ///
    /// Propagates the first handler error.
    pub async fn settle(&mut self) -> Result<()> {
        while !self.is_idle() && !self.finished {
            let event = self
                .events_rx
                .recv()
                .await
                .ok_or_else(|| ShikimoreError::Runtime("event channel closed".to_string()))?;
            self.dispatch(event)?;
        }
        Ok(())
    }

    /// Detaches the view, cancelling pending timers.
    ///
    /// # Errors
    ///
    /// Propagates errors from the event handler.
    pub fn unmount(&mut self) -> Result<()> {
        self.dispatch(Event::Unmounted)?;
        self.abort_timers();
        Ok(())
    }

    fn account(&mut self, event: &Event) {
        match event {
            Event::DebounceElapsed(token) => {
                self.timers.remove(token);
            }
            Event::SearchCompleted { .. }
            | Event::DetailLoaded { .. }
            | Event::GenresLoaded(_)
            | Event::SuggestionsLoaded { .. }
            | Event::AccentColorResolved { .. } => {
                self.in_flight = self.in_flight.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn execute(&mut self, action: Action) {
        tracing::trace!(?action, "executing action");
        match action {
            Action::Fetch(request) => {
                self.in_flight += 1;
                tasks::search(Arc::clone(&self.backend), self.events_tx.clone(), request);
            }
            Action::FetchDetail(key) => {
                self.in_flight += 1;
                tasks::detail(Arc::clone(&self.backend), self.events_tx.clone(), key);
            }
            Action::LoadGenres => {
                self.in_flight += 1;
                tasks::genres(Arc::clone(&self.backend), self.events_tx.clone());
            }
            Action::FetchSuggestions {
                content_type,
                input,
            } => {
                self.in_flight += 1;
                tasks::suggestions(
                    Arc::clone(&self.backend),
                    self.events_tx.clone(),
                    content_type,
                    input,
                );
            }
            Action::FetchAccentColor { key, url } => {
                self.in_flight += 1;
                tasks::accent_color(Arc::clone(&self.backend), self.events_tx.clone(), key, url);
            }
            Action::ScheduleTimer { token, delay } => {
                let handle = tasks::timer(self.events_tx.clone(), token, delay);
                if let Some(previous) = self.timers.insert(token, handle) {
                    previous.abort();
                }
            }
            Action::CancelTimer(token) => {
                if let Some(handle) = self.timers.remove(&token) {
                    handle.abort();
                }
            }
            Action::Persist { key, value } => {
                if let Err(e) = self.store.set(key, &value) {
                    tracing::debug!(key, error = %e, "failed to persist value");
                }
            }
            Action::Remove { key } => {
                if let Err(e) = self.store.remove(key) {
                    tracing::debug!(key, error = %e, "failed to remove value");
                }
            }
            Action::Quit => {
                self.finished = true;
                self.abort_timers();
            }
        }
    }

    fn abort_timers(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

impl<B: CatalogBackend, S: KeyValueStore> Drop for Session<B, S> {
    fn drop(&mut self) {
        self.abort_timers();
    }
}

impl<B: CatalogBackend, S: KeyValueStore> std::fmt::Debug for Session<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("timers", &self.timers.len())
            .field("in_flight", &self.in_flight)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FixtureBackend, FixtureCatalog};
    use crate::navigation::HISTORY_KEY;
    use crate::storage::{MemoryStore, LAST_SEARCH_KEY};
    use std::time::Duration;

    fn session() -> Session<FixtureBackend, MemoryStore> {
        let backend = FixtureBackend::new(FixtureCatalog::default()).unwrap();
        Session::new(&Config::default(), Arc::new(backend), MemoryStore::new())
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_query_is_persisted_once_it_fires() {
        let mut session = session();
        session.dispatch(Event::Mounted).unwrap();
        session.dispatch(Event::QueryChanged("mon".into())).unwrap();
        session.dispatch(Event::QueryChanged("monster".into())).unwrap();
        assert_eq!(session.timers.len(), 1);

        session.settle().await.unwrap();

        assert!(session.is_idle());
        assert_eq!(
            session.store().get(LAST_SEARCH_KEY).unwrap().as_deref(),
            Some("monster")
        );
        assert_eq!(
            session.store().get(HISTORY_KEY).unwrap().as_deref(),
            Some("[\"monster\"]")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn quit_stops_timers() {
        let mut session = session();
        session.dispatch(Event::QueryChanged("x".into())).unwrap();
        session.dispatch(Event::Quit).unwrap();
        assert!(session.is_finished());
        assert!(session.timers.is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_prevents_a_pending_search() {
        let mut session = session();
        session.dispatch(Event::Mounted).unwrap();
        session.settle().await.unwrap();
        session.dispatch(Event::QueryChanged("late".into())).unwrap();
        session.unmount().unwrap();

        assert!(session.is_idle());
        assert!(!session.state().search.state().loading);
        assert_eq!(session.store().get(LAST_SEARCH_KEY).unwrap(), None);
    }
}
