//! Front-panel switch: click and long-press detection.
//!
//! ## Hardware
//!
//! Active-high momentary switch, debounced in hardware.  The level is
//! sampled once per tick by the orchestrator and passed to
//! [`SwitchInput::clk_in`].
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition on release           | Event                   |
//! |-------------|--------------------------------|-------------------------|
//! | Click       | held ≤ long-press threshold    | `SwitchEvent::Click`    |
//! | Long press  | held > long-press threshold    | `SwitchEvent::LongPress`|
//!
//! Events are only reported while the switch is owned through its
//! [`Arbiter`].

use log::debug;

use crate::arbiter::Arbiter;

/// Switch gestures reported on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEvent {
    Click,
    LongPress,
}

pub struct SwitchInput {
    long_press_ticks: u32,
    pressed: bool,
    /// Ticks the switch has been held in the current press.
    duration: u32,
    arbiter: Arbiter,
}

impl SwitchInput {
    pub fn new(long_press_ticks: u32) -> Self {
        Self {
            long_press_ticks,
            pressed: false,
            duration: 0,
            arbiter: Arbiter::new(),
        }
    }

    /// Sample the switch level.  Call once per tick.
    pub fn clk_in(&mut self, level: bool) -> Option<SwitchEvent> {
        self.arbiter.clk_in();

        let event = match (self.pressed, level) {
            (false, true) => {
                self.duration = 1;
                None
            }
            (true, true) => {
                self.duration = self.duration.saturating_add(1);
                None
            }
            (true, false) => Some(if self.duration > self.long_press_ticks {
                SwitchEvent::LongPress
            } else {
                SwitchEvent::Click
            }),
            (false, false) => None,
        };
        self.pressed = level;

        if self.arbiter.is_available() {
            return None;
        }
        if let Some(e) = event {
            debug!("Switch: {:?} after {} ticks", e, self.duration);
        }
        event
    }

    /// Drop any press in progress.
    pub fn clear(&mut self) {
        self.pressed = false;
        self.duration = 0;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// `true` once the current press has passed the long-press threshold.
    pub fn is_long_press(&self) -> bool {
        self.pressed && self.duration > self.long_press_ticks
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
