//! Operating-mode state machine.
//!
//! ```text
//!                 ┌──── Click / TimerExpired (START) ───▶ ┌────────┐
//!                 │                                        │ MANUAL │
//!                 │ ◀── MeasComplete / MeasError (STOP) ── └────────┘
//!           ┌───────┐
//!           │ TIMER │
//!           └───────┘
//!                 │ ──── LongPress (START) ──────────────▶ ┌────────────┐
//!                 │                                        │ CONTINUOUS │
//!                 └ ◀── Click / LongPress / MeasError ──── └────────────┘
//!                                 (STOP)
//! ```
//!
//! Signals are evaluated synchronously on delivery, not per tick.  The
//! resulting [`MeasCommand`] is only meaningful right after
//! [`ModeMachine::has_status_updated`] returned `true`: it is overwritten
//! on every delivery, including no-op ones.

pub mod table;

use log::info;
use serde::{Deserialize, Serialize};

pub use table::transition;

// ---------------------------------------------------------------------------
// Mode, signal, command
// ---------------------------------------------------------------------------

/// Instrument operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Idle, waiting for the interval timer or the switch.
    #[default]
    Timer,
    /// One single-shot measurement.
    Manual,
    /// Sampling at a fixed interval until stopped.
    Continuous,
}

impl Mode {
    pub const ALL: [Self; 3] = [Self::Timer, Self::Manual, Self::Continuous];

    /// One-character display indicator.
    pub const fn indicator(self) -> char {
        match self {
            Self::Timer => 'T',
            Self::Manual => 'M',
            Self::Continuous => 'C',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Timer => "TIMER",
            Self::Manual => "MANUAL",
            Self::Continuous => "CONTINUOUS",
        }
    }
}

/// Event delivered to the machine; consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionSignal {
    Click,
    LongPress,
    TimerExpired,
    MeasurementComplete,
    MeasurementError,
    None,
}

impl TransitionSignal {
    pub const ALL: [Self; 6] = [
        Self::Click,
        Self::LongPress,
        Self::TimerExpired,
        Self::MeasurementComplete,
        Self::MeasurementError,
        Self::None,
    ];
}

/// Command forwarded to the measurement engine after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasCommand {
    #[default]
    Idle,
    Start,
    Stop,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    mode: Mode,
    command: MeasCommand,
    updated: bool,
}

impl ModeMachine {
    /// Starts in [`Mode::Timer`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one signal.  Returns `true` if the mode changed.
    pub fn set_transit_signal(&mut self, signal: TransitionSignal) -> bool {
        let (next, command) = transition(self.mode, signal);
        self.command = command;
        self.updated = next != self.mode;

        if self.updated {
            info!(
                "Mode transition: {} -> {} on {:?} ({:?})",
                self.mode.name(),
                next.name(),
                signal,
                command
            );
            self.mode = next;
        }
        self.updated
    }

    /// Read-and-clear: the last delivered signal changed the mode.
    pub fn has_status_updated(&mut self) -> bool {
        core::mem::take(&mut self.updated)
    }

    /// Command produced by the last delivered signal.
    pub fn meas_command(&self) -> MeasCommand {
        self.command
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_timer() {
        let m = ModeMachine::new();
        assert_eq!(m.mode(), Mode::Timer);
        assert_eq!(m.meas_command(), MeasCommand::Idle);
    }

    #[test]
    fn click_starts_manual_and_complete_returns() {
        let mut m = ModeMachine::new();
        assert!(m.set_transit_signal(TransitionSignal::Click));
        assert!(m.has_status_updated());
        assert!(!m.has_status_updated());
        assert_eq!(m.mode(), Mode::Manual);
        assert_eq!(m.meas_command(), MeasCommand::Start);

        assert!(m.set_transit_signal(TransitionSignal::MeasurementComplete));
        assert_eq!(m.mode(), Mode::Timer);
        assert_eq!(m.meas_command(), MeasCommand::Stop);
    }

    #[test]
    fn noop_signal_overwrites_command() {
        let mut m = ModeMachine::new();
        m.set_transit_signal(TransitionSignal::LongPress);
        assert_eq!(m.meas_command(), MeasCommand::Start);
        assert!(m.has_status_updated());

        assert!(!m.set_transit_signal(TransitionSignal::TimerExpired));
        assert!(!m.has_status_updated());
        assert_eq!(m.mode(), Mode::Continuous);
        assert_eq!(m.meas_command(), MeasCommand::Idle);
    }

    #[test]
    fn error_in_timer_yields_stop_without_update() {
        let mut m = ModeMachine::new();
        assert!(!m.set_transit_signal(TransitionSignal::MeasurementError));
        assert_eq!(m.mode(), Mode::Timer);
        assert_eq!(m.meas_command(), MeasCommand::Stop);
        assert!(!m.has_status_updated());
    }

    #[test]
    fn indicators() {
        let s: String = Mode::ALL.iter().map(|m| m.indicator()).collect();
        assert_eq!(s, "TMC");
    }
}
