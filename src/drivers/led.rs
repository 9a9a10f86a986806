//! Single-colour status LED with solid and blink patterns.
//!
//! The driver only computes the pin level; the orchestrator forwards it
//! to the panel each tick.

use log::warn;

use crate::arbiter::Arbiter;
use crate::error::{ConfigError, Result};

/// Accepted blink half-periods [ticks].
pub const BLINK_PERIOD_RANGE: core::ops::RangeInclusive<u16> = 1..=200;
pub const DEFAULT_BLINK_PERIOD: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedPattern {
    #[default]
    Off,
    Solid,
    Blink,
}

pub struct StatusLed {
    pattern: LedPattern,
    blink_period: u16,
    blink_count: u16,
    blink_on: bool,
    arbiter: Arbiter,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self {
            pattern: LedPattern::Off,
            blink_period: DEFAULT_BLINK_PERIOD,
            blink_count: DEFAULT_BLINK_PERIOD,
            blink_on: true,
            arbiter: Arbiter::new(),
        }
    }

    /// Set the blink half-period.  Out-of-range values load the default
    /// and report an error.
    pub fn set_blink_period(&mut self, ticks: u16) -> Result<()> {
        let result = if BLINK_PERIOD_RANGE.contains(&ticks) {
            self.blink_period = ticks;
            Ok(())
        } else {
            warn!("StatusLed: blink period {} out of range, using {}", ticks, DEFAULT_BLINK_PERIOD);
            self.blink_period = DEFAULT_BLINK_PERIOD;
            Err(ConfigError::BlinkPeriodOutOfRange(ticks).into())
        };
        self.restart_blink();
        result
    }

    /// Change the pattern.  Ignored while the LED is busy; returns whether
    /// it was applied.
    pub fn set_pattern(&mut self, pattern: LedPattern) -> bool {
        if !self.arbiter.is_ready() {
            return false;
        }
        if pattern != self.pattern {
            self.pattern = pattern;
            self.restart_blink();
        }
        true
    }

    pub fn pattern(&self) -> LedPattern {
        self.pattern
    }

    /// Advance one tick and return the pin level.
    pub fn clk_in(&mut self) -> bool {
        self.arbiter.clk_in();

        match self.pattern {
            LedPattern::Off => {
                self.restart_blink();
                false
            }
            LedPattern::Solid => true,
            LedPattern::Blink => {
                self.blink_count = self.blink_count.saturating_sub(1);
                if self.blink_count == 0 {
                    self.blink_count = self.blink_period;
                    self.blink_on = !self.blink_on;
                }
                self.blink_on
            }
        }
    }

    fn restart_blink(&mut self) {
        self.blink_count = self.blink_period;
        self.blink_on = true;
    }

    // ── Ownership ─────────────────────────────────────────────

    pub fn acquire(&mut self) -> bool {
        self.arbiter.acquire()
    }

    pub fn free(&mut self) {
        self.arbiter.free();
    }

    pub fn is_ready(&self) -> bool {
        self.arbiter.is_ready()
    }

    pub fn is_available(&self) -> bool {
        self.arbiter.is_available()
    }
}
