use std::time::{Duration, Instant};

/// Timers advance one second per tick, so ticks fire once per second
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Fixed-interval tick scheduler driven by the event loop.
///
/// Missed ticks are not replayed: after a fire the next deadline is one
/// interval after the fire time, so drift is capped at one tick.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// How long the event loop may block before the next tick is due
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Returns true (and schedules the next tick) when a tick is due
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }
}
