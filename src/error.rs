//! Unified error types for the level meter core.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they can be handed between the measurement engine, the
//! mode machine and the orchestrator without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction with the ADC, a DAC or the GPIO expander failed.
    Device(DeviceError),
    /// The sensor or its current source misbehaved.
    Sensor(SensorError),
    /// A setter was given an out-of-range value; prior state is retained.
    Config(ConfigError),
    /// A measurement command was refused.
    Command(CommandError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "device: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

/// Failures reported by the external device drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// ADC conversion failed or timed out.
    AdcReadFailed,
    /// DAC write was not acknowledged.
    DacWriteFailed,
    /// GPIO expander read or write failed.
    GpioFailed,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::DacWriteFailed => write!(f, "DAC write failed"),
            Self::GpioFailed => write!(f, "GPIO expander access failed"),
        }
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Enable asserted but the fault-detect line reports short or open.
    CurrentSourceFault,
    /// Measured sensor current is zero or negative.
    NoCurrent,
    /// Sensor length of zero gives no nominal resistance.
    ZeroResistance,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentSourceFault => write!(f, "current source fault"),
            Self::NoCurrent => write!(f, "no sensor current"),
            Self::ZeroResistance => write!(f, "zero nominal sensor resistance"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Timer period above the 90 minute limit.
    TimerPeriodOutOfRange(u16),
    /// Level scale bounds inverted, equal, or above 100.0 %.
    InvalidScale { high: u16, low: u16 },
    /// LED blink period outside 1..=200 ticks.
    BlinkPeriodOutOfRange(u16),
    /// A record or config field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimerPeriodOutOfRange(p) => write!(f, "timer period {p} min out of range"),
            Self::InvalidScale { high, low } => {
                write!(f, "invalid scale bounds high={high} low={low}")
            }
            Self::BlinkPeriodOutOfRange(p) => write!(f, "blink period {p} ticks out of range"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// START while a measurement is already in progress.
    Busy,
    /// START while the engine is in TIMER mode (nothing to acquire).
    NotAcquiringMode,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "measurement in progress"),
            Self::NotAcquiringMode => write!(f, "start requested in timer mode"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
