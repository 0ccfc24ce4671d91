//! Application layer coordinating state, events, and actions.
//!
//! This layer sits between the host runtime (`runtime/`) and the
//! domain, search, navigation and backend layers. Nothing here performs I/O.
//!
//! # Architecture
//!
//! ```text
//! User Input → Events → Event Handler → State Mutations → Actions → Side Effects
//!                           ↑                                  ↓
//!                           └────── Backend / Timer Completions ┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`filters`]: Filter bar selections and the genre catalog
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`state`]: Central application state container
//!
//! # Example
//!
//! ```rust
//! use shikimore::app::{handle_event, AppState, Event};
//! use shikimore::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! let (_render, actions) = handle_event(&mut state, &Event::Mounted)?;
//! assert_eq!(actions.len(), 1);
//! # Ok::<(), shikimore::ShikimoreError>(())
//! ```

pub mod actions;
pub mod filters;
pub mod handler;
pub mod state;

pub use actions::Action;
pub use filters::{Filters, GenreCatalog, StudioInput};
pub use handler::{handle_event, Event};
pub use state::{AppState, DetailPane};
