//! Refractory-window debouncing for discrete buttons
//!
//! After an accepted edge, every further edge on the same line is dropped
//! until the window has elapsed. Dropped edges are not queued.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Per-line refractory filter, safe to share between threads
pub struct Debouncer {
    window: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: Mutex::new(None),
        }
    }

    /// Accept an edge observed at `now`
    pub fn accept_at(&self, now: Instant) -> bool {
        let mut last = self.last_accepted.lock();
        match *last {
            Some(prev) if now.saturating_duration_since(prev) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
