use alloc::string::String;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::Seconds;

/// What the caller should do with its tick source after a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockSignal {
    Unchanged,
    Start,
    Stop,
}

/// Source of whole-second ticks fed into a game session.
pub trait Ticker {
    /// Whole seconds elapsed since the previous call; the remainder carries over.
    fn take_ticks(&mut self) -> u32;

    /// React to a session signal, a ticker ignores ticks until started.
    fn apply(&mut self, signal: ClockSignal);
}

/// Ticks only when told to, for deterministic callers and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualTicker {
    pending: u32,
    running: bool,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queue `seconds` ticks; dropped if the ticker is not running.
    pub fn advance(&mut self, seconds: u32) {
        if self.running {
            self.pending = self.pending.saturating_add(seconds);
        }
    }
}

impl Ticker for ManualTicker {
    fn take_ticks(&mut self) -> u32 {
        core::mem::take(&mut self.pending)
    }

    fn apply(&mut self, signal: ClockSignal) {
        match signal {
            ClockSignal::Unchanged => {}
            ClockSignal::Start => self.running = true,
            ClockSignal::Stop => {
                self.running = false;
                self.pending = 0;
            }
        }
    }
}

/// Wall-clock ticker backed by a monotonic instant.
#[derive(Clone, Debug, Default)]
pub struct InstantTicker {
    last: Option<Instant>,
    carry: Duration,
}

impl InstantTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }
}

impl Ticker for InstantTicker {
    fn take_ticks(&mut self) -> u32 {
        let Some(last) = self.last else {
            return 0;
        };
        let now = Instant::now();
        let total = self.carry + now.duration_since(last);
        let ticks = total.as_secs();
        self.carry = total - Duration::from_secs(ticks);
        self.last = Some(now);
        ticks.try_into().unwrap_or(u32::MAX)
    }

    fn apply(&mut self, signal: ClockSignal) {
        match signal {
            ClockSignal::Unchanged => {}
            ClockSignal::Start => {
                if self.last.is_none() {
                    log::trace!("Wall clock started");
                    self.last = Some(Instant::now());
                    self.carry = Duration::ZERO;
                }
            }
            ClockSignal::Stop => {
                self.last = None;
                self.carry = Duration::ZERO;
            }
        }
    }
}

/// Renders seconds as `MM:SS`, minutes keep growing past 59.
pub fn format_elapsed(seconds: Seconds) -> String {
    alloc::format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
