//! Infinite scroll trigger.
//!
//! The host reports scroll geometry and which item is rendered last; the
//! trigger decides when that amounts to a new crossing into the load-more
//! zone. It is edge-triggered: staying in the zone does not fire again until
//! the user leaves and comes back, or a new last item appears (the list grew
//! under the viewport).

use crate::domain::{ContentType, ItemKey, SearchParams};

use super::orchestrator::SearchState;

/// Viewport geometry at one observation, in arbitrary consistent units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub viewport: f64,
    pub content: f64,
    pub last_item: Option<ItemKey>,
}

impl ScrollMetrics {
    /// True once the bottom of the viewport reaches `threshold` of the
    /// scrollable content. Content that fits in the viewport is always in
    /// the zone.
    #[must_use]
    pub fn in_zone(&self, threshold: f64) -> bool {
        self.content <= 0.0 || self.offset + self.viewport >= threshold * self.content
    }
}

/// Search state the load-more guard looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMoreContext {
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub has_query: bool,
    pub content_type: ContentType,
    pub item_count: usize,
}

impl LoadMoreContext {
    #[must_use]
    pub fn new(state: &SearchState, params: &SearchParams) -> Self {
        Self {
            has_more: state.has_more,
            loading: state.loading,
            loading_more: state.loading_more,
            has_query: params.has_query(),
            content_type: params.content_type,
            item_count: state.items.len(),
        }
    }

    #[must_use]
    pub fn allows_load_more(&self) -> bool {
        self.has_more
            && !self.loading
            && !self.loading_more
            && self.item_count > 0
            && (self.has_query || self.content_type.allows_empty_query())
    }
}

#[derive(Debug)]
pub struct InfiniteScrollTrigger {
    threshold: f64,
    attached: bool,
    in_zone: bool,
    observed_last: Option<ItemKey>,
}

impl InfiniteScrollTrigger {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            attached: false,
            in_zone: false,
            observed_last: None,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
        self.in_zone = false;
        self.observed_last = None;
    }

    /// Stops observing. Observations are ignored until the next attach.
    pub fn detach(&mut self) {
        self.attached = false;
        self.in_zone = false;
        self.observed_last = None;
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Records an observation and returns true when load-more should run.
    pub fn observe(&mut self, metrics: &ScrollMetrics, context: &LoadMoreContext) -> bool {
        if !self.attached {
            return false;
        }

        let in_zone = metrics.in_zone(self.threshold);
        let crossing = in_zone && (!self.in_zone || metrics.last_item != self.observed_last);

        self.in_zone = in_zone;
        self.observed_last = metrics.last_item;

        if !crossing {
            return false;
        }

        let fire = context.allows_load_more();
        tracing::trace!(fire, ?context, "scroll crossing");
        fire
    }
}

impl Default for InfiniteScrollTrigger {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> LoadMoreContext {
        LoadMoreContext {
            has_more: true,
            loading: false,
            loading_more: false,
            has_query: true,
            content_type: ContentType::Anime,
            item_count: 20,
        }
    }

    fn at(offset: f64, last: u64) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            viewport: 100.0,
            content: 1000.0,
            last_item: Some(ItemKey::new(ContentType::Anime, last)),
        }
    }

    fn attached() -> InfiniteScrollTrigger {
        let mut trigger = InfiniteScrollTrigger::default();
        trigger.attach();
        trigger
    }

    #[test]
    fn fires_once_per_crossing() {
        let mut trigger = attached();
        assert!(!trigger.observe(&at(100.0, 19), &ready()));
        assert!(trigger.observe(&at(700.0, 19), &ready()));
        assert!(!trigger.observe(&at(750.0, 19), &ready()));

        assert!(!trigger.observe(&at(200.0, 19), &ready()));
        assert!(trigger.observe(&at(800.0, 19), &ready()));
    }

    #[test]
    fn new_last_item_in_zone_is_a_new_crossing() {
        let mut trigger = attached();
        assert!(trigger.observe(&at(900.0, 19), &ready()));
        assert!(trigger.observe(&at(900.0, 39), &ready()));
    }

    #[test]
    fn guard_blocks_while_loading_or_exhausted() {
        let mut trigger = attached();
        let loading_more = LoadMoreContext { loading_more: true, ..ready() };
        assert!(!trigger.observe(&at(900.0, 19), &loading_more));

        let exhausted = LoadMoreContext { has_more: false, ..ready() };
        assert!(!trigger.observe(&at(900.0, 20), &exhausted));

        let empty = LoadMoreContext { item_count: 0, ..ready() };
        assert!(!trigger.observe(&at(900.0, 21), &empty));
    }

    #[test]
    fn blank_query_only_loads_more_for_characters() {
        let mut trigger = attached();
        let anime = LoadMoreContext { has_query: false, ..ready() };
        assert!(!trigger.observe(&at(900.0, 1), &anime));

        let characters = LoadMoreContext {
            has_query: false,
            content_type: ContentType::Characters,
            ..ready()
        };
        assert!(trigger.observe(&at(900.0, 2), &characters));
    }

    #[test]
    fn detached_trigger_ignores_observations() {
        let mut trigger = InfiniteScrollTrigger::default();
        assert!(!trigger.observe(&at(900.0, 19), &ready()));

        trigger.attach();
        trigger.detach();
        assert!(!trigger.is_attached());
        assert!(!trigger.observe(&at(900.0, 19), &ready()));
    }
}
