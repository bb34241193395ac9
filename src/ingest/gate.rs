//! Earliest-next-time rate gate.

use std::time::Duration;

/// Fires at most once per interval on a caller-supplied clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateGate {
    interval: Duration,
    next_at: Duration,
}

impl RateGate {
    /// A gate that is ready immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_at: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the gate may fire at `now`.
    pub fn ready(&self, now: Duration) -> bool {
        now >= self.next_at
    }

    /// Record a firing at `now`; the next one is allowed one interval later.
    pub fn fire(&mut self, now: Duration) {
        self.next_at = now + self.interval;
    }

    /// Fire if ready, returning whether it fired.
    pub fn try_fire(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.fire(now);
            true
        } else {
            false
        }
    }
}
