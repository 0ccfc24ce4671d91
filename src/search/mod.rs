//! The search engine: key encoding, debouncing, paged result state and the
//! infinite scroll trigger.
//!
//! Everything here is synchronous and clock-free. Timers and backend calls
//! are requested from the host through `app::Action`s and their outcomes come
//! back as `app::Event`s.

pub mod debounce;
pub mod orchestrator;
pub mod query_key;
pub mod scroll;
pub mod sort;

pub use debounce::{DebounceGate, Schedule, TimerToken};
pub use orchestrator::{Completion, FetchMode, SearchOrchestrator, SearchRequest, SearchState};
pub use query_key::{encode, QueryKey};
pub use scroll::{InfiniteScrollTrigger, LoadMoreContext, ScrollMetrics};
pub use sort::sort_page;
