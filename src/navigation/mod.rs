//! Search history and detail-view navigation.

pub mod history;
pub mod navigator;

pub use history::{SearchHistory, HISTORY_KEY};
pub use navigator::DetailNavigator;
