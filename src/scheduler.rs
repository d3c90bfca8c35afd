//! Poll cadence.
//!
//! The main loop runs one [`AppService::poll_once`](crate::app::service::AppService::poll_once)
//! per period.  Each poll's measured duration is subtracted from the
//! period to get the sleep that holds the loop to a fixed rate.
//!
//! ```text
//!  ├──── poll ────┤────── sleep ──────┤──── poll ────┤── sleep ──┤
//!  ├────────── poll_period_ms ────────┤
//! ```
//!
//! A poll that takes longer than the period is an overrun: no sleep,
//! counted and logged.

use log::warn;

use crate::config::SystemConfig;

#[derive(Debug, Clone)]
pub struct PollCadence {
    period_ms: u32,
    polls: u64,
    overruns: u32,
}

impl PollCadence {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            polls: 0,
            overruns: 0,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.poll_period_ms)
    }

    /// Record a finished poll that started at `started_ms` and return how
    /// long to sleep before the next one.
    pub fn remaining_ms(&mut self, started_ms: u64, now_ms: u64) -> u32 {
        self.polls = self.polls.wrapping_add(1);
        let elapsed = now_ms.saturating_sub(started_ms);
        let period = u64::from(self.period_ms);
        if elapsed > period {
            self.overruns = self.overruns.saturating_add(1);
            warn!(
                "poll #{} overran: {} ms > {} ms",
                self.polls, elapsed, self.period_ms
            );
            0
        } else {
            (period - elapsed) as u32
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}
