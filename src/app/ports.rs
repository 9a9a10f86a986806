//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Instrument (domain)
//! ```
//!
//! Device drivers (ADC, DACs, GPIO expander), the front panel, event sinks
//! and the parameter store implement these traits.  The
//! [`Instrument`](super::service::Instrument) and the
//! [`MeasurementEngine`](crate::measurement::MeasurementEngine) consume
//! them via generics, so the domain core never touches a bus directly.
//!
//! None of the ports expose bus addressing.  Settling delays go through
//! [`embedded_hal::delay::DelayNs`] so a host simulation can account for
//! them without sleeping.

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::config::ParameterRecord;
use crate::error::{DeviceError, Error};

// ───────────────────────────────────────────────────────────────
// ADC port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Differential input pair of the front-end ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcPair {
    /// AIN0-AIN1: attenuated sensor voltage.
    Ain01,
    /// AIN2-AIN3: transimpedance output of the sensor current.
    Ain23,
}

/// Programmable-gain setting and its full-scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdcGain {
    /// ±6.144 V
    TwoThirds,
    /// ±4.096 V
    One,
    /// ±2.048 V
    Two,
    /// ±1.024 V
    Four,
    /// ±0.512 V
    Eight,
    /// ±0.256 V
    Sixteen,
}

impl AdcGain {
    /// Weight of one LSB [µV].
    pub fn microvolts_per_lsb(self) -> f32 {
        match self {
            Self::TwoThirds => 187.506,
            Self::One => 125.004,
            Self::Two => 62.5019,
            Self::Four => 31.2510,
            Self::Eight => 15.6255,
            Self::Sixteen => 7.81274,
        }
    }
}

/// One differential conversion per call.
pub trait DifferentialAdc {
    fn read_differential(&mut self, pair: AdcPair, gain: AdcGain) -> Result<i16, DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// DAC port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DacChannel {
    /// 12-bit setpoint of the sensor current source.
    CurrentSetpoint,
    /// 16-bit analog level monitor output.
    Monitor,
}

/// "Set voltage by code" on either DAC.
pub trait DacOutputs {
    fn set_dac(&mut self, channel: DacChannel, code: u16) -> Result<(), DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// GPIO expander port
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Pin-level access to the I/O expander.
///
/// `true` is a logic-high level; active-low semantics live in the caller.
pub trait GpioExpander {
    fn set_direction(&mut self, pin: u8, direction: PinDirection) -> Result<(), DeviceError>;
    fn set_pull_up(&mut self, pin: u8, enabled: bool) -> Result<(), DeviceError>;
    fn read(&mut self, pin: u8) -> Result<bool, DeviceError>;
    fn write(&mut self, pin: u8, high: bool) -> Result<(), DeviceError>;
}

/// Everything the measurement engine needs from the board.
pub trait MeasurementHardware: DifferentialAdc + DacOutputs + GpioExpander + DelayNs {}

impl<T: DifferentialAdc + DacOutputs + GpioExpander + DelayNs> MeasurementHardware for T {}

// ───────────────────────────────────────────────────────────────
// Panel port (driven adapter: domain → display / LED)
// ───────────────────────────────────────────────────────────────

/// Setters consumed by the display and LED subsystems.
///
/// Rendering and formatting stay on the adapter side.  An adapter that
/// shares the bus with the measurement front end must skip its own
/// transactions while `set_vacate_bus(true)` is in effect.
pub trait PanelPort {
    /// `'T'`, `'M'` or `'C'`.
    fn set_mode_indicator(&mut self, indicator: char);

    /// Latest level [0.1 %].
    fn set_level(&mut self, level: u16);

    fn set_sensor_error(&mut self, error: bool);

    /// Minutes left on the interval timer.
    fn set_timer_remaining(&mut self, minutes: u16);

    fn set_vacate_bus(&mut self, vacate: bool);

    /// Status LED pin level.
    fn set_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// telemetry formatter, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Parameter port (driven adapter: non-volatile store → domain)
// ───────────────────────────────────────────────────────────────

/// Read-only access to the calibration record.
///
/// The core never writes parameters back; the store owns them.
pub trait ParameterPort {
    /// Load and validate the record.
    fn load(&self) -> Result<ParameterRecord, Error>;
}
