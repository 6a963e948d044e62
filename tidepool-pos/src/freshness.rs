//! Cache freshness and refresh debouncing
//!
//! The list cache and the tab refresh both used to hide their timing inside
//! booleans and raw timestamps; here they are explicit values with pure
//! predicates, so the timing rules are testable without any network or
//! timer mocking.

use std::time::{Duration, Instant};

/// How long a fetched cart list stays fresh. Debounces rapid repeated list
/// calls during tab operations; not a long-lived cache.
pub const LIST_CACHE_WINDOW: Duration = Duration::from_millis(500);

/// Delay between a "cart updated" report and the tab list refresh it
/// schedules.
pub const TAB_REFRESH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Records when a cached value was fetched
#[derive(Debug, Clone, Copy)]
pub struct CacheStamp {
    fetched_at: Instant,
}

impl CacheStamp {
    pub fn now() -> Self {
        Self::at(Instant::now())
    }

    pub fn at(fetched_at: Instant) -> Self {
        Self { fetched_at }
    }

    /// Whether the stamped value is still fresh at `now`
    pub fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) <= window
    }
}

/// A pending debounced refresh, modeled as data
///
/// `schedule` arms the refresh; `take_due` fires it at most once when the
/// delay has elapsed. Suppression while a load is in flight is the caller's
/// rule, applied before `schedule`.
#[derive(Debug, Default)]
pub struct RefreshDebounce {
    due_at: Option<Instant>,
}

impl RefreshDebounce {
    pub fn schedule(&mut self, now: Instant) {
        self.due_at = Some(now + TAB_REFRESH_DEBOUNCE);
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.due_at.is_some()
    }

    /// Consume the pending refresh if its delay has elapsed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_is_fresh_within_window() {
        let t0 = Instant::now();
        let stamp = CacheStamp::at(t0);
        assert!(stamp.is_fresh(t0 + Duration::from_millis(100), LIST_CACHE_WINDOW));
        assert!(stamp.is_fresh(t0 + LIST_CACHE_WINDOW, LIST_CACHE_WINDOW));
        assert!(!stamp.is_fresh(t0 + Duration::from_millis(501), LIST_CACHE_WINDOW));
    }

    #[test]
    fn debounce_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut debounce = RefreshDebounce::default();
        assert!(!debounce.take_due(t0));

        debounce.schedule(t0);
        assert!(debounce.is_scheduled());
        assert!(!debounce.take_due(t0 + Duration::from_millis(100)));
        assert!(debounce.take_due(t0 + TAB_REFRESH_DEBOUNCE));
        // consumed
        assert!(!debounce.take_due(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn reschedule_pushes_the_deadline() {
        let t0 = Instant::now();
        let mut debounce = RefreshDebounce::default();
        debounce.schedule(t0);
        debounce.schedule(t0 + Duration::from_millis(200));
        assert!(!debounce.take_due(t0 + Duration::from_millis(300)));
        assert!(debounce.take_due(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_disarms() {
        let t0 = Instant::now();
        let mut debounce = RefreshDebounce::default();
        debounce.schedule(t0);
        debounce.cancel();
        assert!(!debounce.take_due(t0 + Duration::from_secs(1)));
    }
}
