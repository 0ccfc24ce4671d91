//! Back-navigation across nested detail views.

use crate::domain::ItemKey;

/// The entity shown in the detail pane plus the frames to return to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailNavigator {
    current: Option<ItemKey>,
    stack: Vec<ItemKey>,
}

impl DetailNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `frame`, remembering the current one. Returns the frame to fetch.
    pub fn open(&mut self, frame: ItemKey) -> ItemKey {
        if let Some(previous) = self.current.replace(frame) {
            self.stack.push(previous);
        }
        frame
    }

    /// Returns to the previous frame, or to the list when there is none.
    ///
    /// The returned frame (if any) must be fetched again.
    pub fn back(&mut self) -> Option<ItemKey> {
        self.current = self.stack.pop();
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.stack.clear();
    }

    #[must_use]
    pub const fn current(&self) -> Option<ItemKey> {
        self.current
    }

    /// Number of frames `back` can return to.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
