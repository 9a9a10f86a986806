//! Interval timer ("time switch") driving TIMER-mode measurements.
//!
//! Counts a configurable period down in ticks and raises two one-shot
//! flags the orchestrator polls after each [`IntervalTimer::clk_in`]:
//!
//! ```text
//!   period = 30 min, 6000 ticks/min
//!
//!   tick  0 ─────── 6000 ─────── 12000 ─ ... ─ 180000 ──▶ reload
//!                    │             │              │
//!               minute-elapsed  minute-elapsed  minute-elapsed + overflow
//!   remaining: 30    29            28             30 (wrapped)
//! ```
//!
//! The timer knows nothing about modes or measurements; the orchestrator
//! turns an overflow into a `TimerExpired` transition signal.

use log::{info, warn};

use crate::config::MAX_TIMER_PERIOD_MIN;
use crate::error::{ConfigError, Result};

/// Granularity the period is truncated to [min].
pub const PERIOD_UNIT_MIN: u16 = 10;

// ═══════════════════════════════════════════════════════════════
//  Interval timer
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct IntervalTimer {
    ticks_per_minute: u32,
    /// Configured period [min]; 0 disables the timer.
    period_min: u16,
    /// Ticks until the next overflow.
    countdown: u32,
    /// Whole minutes until the next overflow.
    remaining_min: u16,
    overflow: bool,
    minute_elapsed: bool,
}

impl IntervalTimer {
    /// A disabled timer.  Call [`init`](Self::init) to arm it.
    pub fn new(ticks_per_minute: u32) -> Self {
        Self {
            ticks_per_minute,
            period_min: 0,
            countdown: 0,
            remaining_min: 0,
            overflow: false,
            minute_elapsed: false,
        }
    }

    /// Load a new period.
    ///
    /// Periods above 90 minutes are rejected and the running configuration
    /// is kept.  Accepted periods are truncated to whole 10-minute units.
    pub fn init(&mut self, period_min: u16) -> Result<()> {
        if period_min > MAX_TIMER_PERIOD_MIN {
            warn!("IntervalTimer: period {} min rejected (max {})", period_min, MAX_TIMER_PERIOD_MIN);
            return Err(ConfigError::TimerPeriodOutOfRange(period_min).into());
        }

        let period = period_min / PERIOD_UNIT_MIN * PERIOD_UNIT_MIN;
        self.period_min = period;
        self.countdown = u32::from(period) * self.ticks_per_minute;
        self.remaining_min = period;
        self.overflow = false;
        self.minute_elapsed = false;

        if period == 0 {
            info!("IntervalTimer: disabled");
        } else {
            info!("IntervalTimer: period {} min", period);
        }
        Ok(())
    }

    /// Advance one tick.
    ///
    /// A zero period or a zero tick rate leaves the timer stopped.
    pub fn clk_in(&mut self) {
        if self.period_min == 0 || self.ticks_per_minute == 0 {
            return;
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = u32::from(self.period_min) * self.ticks_per_minute;
            self.overflow = true;
        }

        if self.countdown % self.ticks_per_minute == 0 {
            self.minute_elapsed = true;
            self.remaining_min = self.remaining_min.saturating_sub(1);
            if self.remaining_min == 0 {
                self.remaining_min = self.period_min;
            }
        }
    }

    /// Read-and-clear: the period elapsed since the last call.
    pub fn has_overflow(&mut self) -> bool {
        core::mem::take(&mut self.overflow)
    }

    /// Read-and-clear: a minute boundary was crossed since the last call.
    pub fn has_lapsed_one_minute(&mut self) -> bool {
        core::mem::take(&mut self.minute_elapsed)
    }

    pub fn is_active(&self) -> bool {
        self.period_min != 0
    }

    /// Whole minutes until the next overflow.
    pub fn remaining_time(&self) -> u16 {
        self.remaining_min
    }

    pub fn period(&self) -> u16 {
        self.period_min
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
