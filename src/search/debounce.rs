//! Debounce gate for query input.
//!
//! The gate never touches a clock. It hands out a [`TimerToken`] per
//! scheduled fire and the host reports back when that token's delay has
//! elapsed. Only the currently pending token fires; any other token that
//! arrives late (superseded, committed, cleared, torn down) is ignored, so a
//! host that fails to cancel a timer still cannot cause a stray search.

use std::time::Duration;

/// Identifies one scheduled fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What the host must do after a [`DebounceGate::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Timer to start.
    pub token: TimerToken,
    pub delay: Duration,
    /// Timer to stop, if one was pending.
    pub cancel: Option<TimerToken>,
}

#[derive(Debug)]
pub struct DebounceGate {
    delay: Duration,
    next_token: u64,
    pending: Option<(TimerToken, String)>,
}

impl DebounceGate {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_token: 0,
            pending: None,
        }
    }

    /// Replaces any pending fire with a new one for `query`.
    pub fn trigger(&mut self, query: impl Into<String>) -> Schedule {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let cancel = self.pending.replace((token, query.into())).map(|(t, _)| t);

        tracing::trace!(token = token.get(), cancelled = ?cancel.map(TimerToken::get), "debounce armed");

        Schedule {
            token,
            delay: self.delay,
            cancel,
        }
    }

    /// Returns the query to search for if `token` is still the pending one.
    pub fn elapsed(&mut self, token: TimerToken) -> Option<String> {
        match &self.pending {
            Some((pending, _)) if *pending == token => self.pending.take().map(|(_, query)| query),
            _ => {
                tracing::trace!(token = token.get(), "ignoring stale debounce timer");
                None
            }
        }
    }

    /// Drops the pending fire without searching.
    ///
    /// Used for commit (the caller fires immediately), clear and teardown.
    /// Returns the token whose timer the host should stop.
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take().map(|(token, _)| token)
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_query(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, query)| query.as_str())
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(400))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_triggers_collapse_to_the_last_query() {
        let mut gate = DebounceGate::default();
        let first = gate.trigger("n");
        let second = gate.trigger("na");
        let third = gate.trigger("nar");

        assert_eq!(second.cancel, Some(first.token));
        assert_eq!(third.cancel, Some(second.token));

        assert_eq!(gate.elapsed(first.token), None);
        assert_eq!(gate.elapsed(second.token), None);
        assert_eq!(gate.elapsed(third.token).as_deref(), Some("nar"));
        assert!(!gate.is_pending());
    }

    #[test]
    fn timer_fires_once() {
        let mut gate = DebounceGate::default();
        let schedule = gate.trigger("bleach");
        assert!(gate.elapsed(schedule.token).is_some());
        assert!(gate.elapsed(schedule.token).is_none());
    }

    #[test]
    fn cancel_prevents_late_fire() {
        let mut gate = DebounceGate::default();
        let schedule = gate.trigger("one piece");
        assert_eq!(gate.cancel(), Some(schedule.token));
        assert_eq!(gate.cancel(), None);
        assert_eq!(gate.elapsed(schedule.token), None);
    }

    #[test]
    fn first_trigger_has_nothing_to_cancel() {
        let mut gate = DebounceGate::new(Duration::from_millis(250));
        let schedule = gate.trigger("x");
        assert_eq!(schedule.cancel, None);
        assert_eq!(schedule.delay, Duration::from_millis(250));
        assert_eq!(gate.pending_query(), Some("x"));
    }
}
