//! Round countdown scheduling
//!
//! A `Countdown` is a plain value owned by an active round. It never runs on its
//! own: the server loop polls it, and dropping it cancels it. Ticks are laid out
//! on a fixed cadence from the moment the round started so that late polls do
//! not push every later tick back.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Countdown {
    interval: Duration,
    next_tick: Instant,
    fired: u32,
}

impl Countdown {
    /// Starts a countdown whose first tick is due one interval after `now`
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_tick: now + interval,
            fired: 0,
        }
    }

    /// Fires at most one due tick. Returns false when nothing is due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }

        self.next_tick += self.interval;
        self.fired += 1;
        true
    }

    #[cfg(test)]
    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    /// Number of ticks fired so far
    pub fn fired(&self) -> u32 {
        self.fired
    }
}
