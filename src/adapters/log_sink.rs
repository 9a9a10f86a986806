//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (serial console in production, stderr on the bench).
//! The telemetry formatter on the gateway side implements the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | mode={}", mode.indicator());
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from.name(), to.name());
            }
            AppEvent::MeasurementStarted(mode) => {
                info!("MEAS  | start ({})", mode.name());
            }
            AppEvent::LevelMeasured { level, raw } => {
                info!(
                    "LEVEL | {}.{} % (raw {}.{} %)",
                    level / 10,
                    level % 10,
                    raw / 10,
                    raw % 10
                );
            }
            AppEvent::MeasurementFinished { level } => {
                info!("MEAS  | finished at {}.{} %", level / 10, level % 10);
            }
            AppEvent::SensorFault => {
                warn!("FAULT | sensor error, measurement terminated");
            }
            AppEvent::TimerMinuteElapsed { remaining } => {
                info!("TIMER | {} min remaining", remaining);
            }
            AppEvent::CommandRejected(reason) => {
                warn!("CMD   | rejected: {}", reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::Mode;

    #[test]
    fn renders_every_event_without_a_logger() {
        let mut sink = LogEventSink::new();
        let events = [
            AppEvent::Started(Mode::Timer),
            AppEvent::ModeChanged {
                from: Mode::Timer,
                to: Mode::Manual,
            },
            AppEvent::MeasurementStarted(Mode::Manual),
            AppEvent::LevelMeasured { level: 505, raw: 500 },
            AppEvent::MeasurementFinished { level: 505 },
            AppEvent::SensorFault,
            AppEvent::TimerMinuteElapsed { remaining: 9 },
            AppEvent::CommandRejected("timer period out of range"),
        ];
        for event in &events {
            sink.emit(event);
        }
    }
}
