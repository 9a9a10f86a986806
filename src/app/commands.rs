//! Inbound commands to the control core.
//!
//! These represent actions requested by the outside world (serial console,
//! remote gateway) that the [`Instrument`](super::service::Instrument)
//! interprets and acts upon.

use crate::fsm::TransitionSignal;

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Reload the interval timer with a new period [min].
    SetTimerPeriod(u16),

    /// Queue a transition signal for delivery on the next tick
    /// (e.g. a remote trigger standing in for the switch).
    Inject(TransitionSignal),
}
