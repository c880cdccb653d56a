//! Client-side rate budgeting for live sources.
//!
//! A fixed window of request timestamps. The caller asks how long it must
//! wait before the next request fits the budget, sleeps if needed, then
//! records the request. Time is passed in, so tests drive the window with
//! synthetic instants instead of sleeping.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::RateLimit;

/// Fixed-window request budget: at most `max_requests` within any
/// trailing `window`.
#[derive(Debug)]
pub struct RateWindow {
    max_requests: usize,
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl RateWindow {
    /// Creates a window from a configured budget.
    #[must_use]
    pub fn new(limit: RateLimit) -> Self {
        Self {
            max_requests: limit.max_requests.max(1) as usize,
            window: Duration::from_secs(limit.window_secs.max(1)),
            stamps: VecDeque::new(),
        }
    }

    /// Returns how long the caller must wait (as of `now`) before the next
    /// request fits the budget, or `None` if it fits immediately.
    pub fn next_delay(&mut self, now: Instant) -> Option<Duration> {
        while let Some(front) = self.stamps.front() {
            if now.duration_since(*front) >= self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
        if self.stamps.len() < self.max_requests {
            None
        } else {
            let oldest = *self.stamps.front()?;
            Some(self.window - now.duration_since(oldest))
        }
    }

    /// Records a request issued at `now`.
    pub fn record(&mut self, now: Instant) {
        self.stamps.push_back(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(max_requests: u32, window_secs: u64) -> RateWindow {
        RateWindow::new(RateLimit {
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn allows_requests_under_budget() {
        let mut window = budget(3, 60);
        let t0 = Instant::now();
        for i in 0..3 {
            assert_eq!(window.next_delay(t0 + Duration::from_secs(i)), None);
            window.record(t0 + Duration::from_secs(i));
        }
    }

    #[test]
    fn delays_when_budget_exhausted() {
        let mut window = budget(2, 60);
        let t0 = Instant::now();
        window.record(t0);
        window.record(t0 + Duration::from_secs(10));

        let delay = window.next_delay(t0 + Duration::from_secs(20)).unwrap();
        assert_eq!(delay, Duration::from_secs(40));
    }

    #[test]
    fn frees_budget_as_the_window_slides() {
        let mut window = budget(1, 60);
        let t0 = Instant::now();
        window.record(t0);
        assert!(window.next_delay(t0 + Duration::from_secs(30)).is_some());
        assert_eq!(window.next_delay(t0 + Duration::from_secs(61)), None);
    }
}
