//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where persistent state and trace files live, and expands
//! user-supplied paths from configuration.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir, store_path, trace_path};
