//! The mode transition table.
//!
//! A pure function of (mode, signal).  Every cell is spelled out so adding
//! a mode or a signal is a compile error until the table is extended.

use super::{MeasCommand, Mode, TransitionSignal};

/// Evaluate one table cell.
///
/// Undefined cells return the current mode and [`MeasCommand::Idle`].
pub const fn transition(mode: Mode, signal: TransitionSignal) -> (Mode, MeasCommand) {
    use MeasCommand::{Idle, Start, Stop};
    use Mode::{Continuous, Manual, Timer};
    use TransitionSignal as S;

    match (mode, signal) {
        // ── TIMER ─────────────────────────────────────────────
        (Timer, S::Click) => (Manual, Start),
        (Timer, S::LongPress) => (Continuous, Start),
        (Timer, S::TimerExpired) => (Manual, Start),
        (Timer, S::MeasurementError) => (Timer, Stop),
        (Timer, S::MeasurementComplete | S::None) => (Timer, Idle),

        // ── MANUAL ────────────────────────────────────────────
        (Manual, S::MeasurementComplete | S::MeasurementError) => (Timer, Stop),
        (Manual, S::Click | S::LongPress | S::TimerExpired | S::None) => (Manual, Idle),

        // ── CONTINUOUS ────────────────────────────────────────
        (Continuous, S::Click | S::LongPress | S::MeasurementError) => (Timer, Stop),
        (Continuous, S::TimerExpired | S::MeasurementComplete | S::None) => (Continuous, Idle),
    }
}
