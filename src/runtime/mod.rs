//! Cooperative executor for the application's actions.
//!
//! The event handler decides, the runtime carries out: it runs timers and
//! backend requests on the current tokio runtime and feeds their outcomes
//! back as events through one channel, in whatever order they finish.
//!
//! # Modules
//!
//! - `session`: the [`Session`] owning state, backend, store and timers
//! - `tasks`: spawned timer and backend tasks that report back as events

pub mod session;
mod tasks;

pub use session::Session;
