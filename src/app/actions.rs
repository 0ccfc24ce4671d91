//! Side effects requested by the event handler.
//!
//! The handler never performs I/O. It returns a `Vec<Action>` after each
//! event and the runtime executes them in order. Every asynchronous action
//! eventually reports back as an [`Event`](crate::app::Event).
//!
//! # Example
//!
//! ```rust
//! use shikimore::app::Action;
//! use shikimore::navigation::HISTORY_KEY;
//!
//! let actions = vec![
//!     Action::LoadGenres,
//!     Action::Remove { key: HISTORY_KEY },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use std::time::Duration;

use crate::domain::{ContentType, ItemKey};
use crate::search::{SearchRequest, TimerToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Runs a search query. Completes with `Event::SearchCompleted`.
    Fetch(SearchRequest),

    /// Loads a detail record. Completes with `Event::DetailLoaded`.
    FetchDetail(ItemKey),

    /// Loads the genre catalog. Completes with `Event::GenresLoaded`.
    LoadGenres,

    /// Looks up studios or publishers for the filter box. Completes with
    /// `Event::SuggestionsLoaded`.
    FetchSuggestions {
        content_type: ContentType,
        input: String,
    },

    /// Resolves a poster's dominant color. Completes with
    /// `Event::AccentColorResolved`.
    FetchAccentColor { key: ItemKey, url: String },

    /// Starts a timer that reports `Event::DebounceElapsed(token)`.
    ScheduleTimer { token: TimerToken, delay: Duration },

    /// Stops a timer started by `ScheduleTimer`, if still running.
    CancelTimer(TimerToken),

    /// Writes a value to the key-value store.
    Persist { key: &'static str, value: String },

    /// Deletes a value from the key-value store.
    Remove { key: &'static str },

    /// Ends the session.
    Quit,
}
