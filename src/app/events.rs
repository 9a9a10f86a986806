//! Outbound application events.
//!
//! The [`Instrument`](super::service::Instrument) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them, e.g. log them or record them in a
//! test.

use serde::Serialize;

use crate::fsm::Mode;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppEvent {
    /// The instrument has started (carries the initial mode).
    Started(Mode),

    /// The mode machine moved between modes.
    ModeChanged { from: Mode, to: Mode },

    /// A measurement session energized the sensor.
    MeasurementStarted(Mode),

    /// A new level is available [0.1 %].
    LevelMeasured { level: u16, raw: u16 },

    /// A single-shot measurement took its final sample.
    MeasurementFinished { level: u16 },

    /// A session ended on a current-source fault or device error.
    SensorFault,

    /// The interval timer crossed a minute boundary.
    TimerMinuteElapsed { remaining: u16 },

    /// A command was refused; the message says why.
    CommandRejected(&'static str),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub serial_number: heapless::String<16>,
    pub mode: Mode,
    /// Latest level [0.1 %].
    pub level: u16,
    pub sensor_error: bool,
    /// Minutes until the next timer-triggered measurement; `None` when disabled.
    pub timer_remaining: Option<u16>,
    pub busy: bool,
}
