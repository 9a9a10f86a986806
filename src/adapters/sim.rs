//! Simulated front end for host runs and tests.
//!
//! [`SimFrontEnd`] stands in for the ADC, both DACs, the GPIO expander and
//! the delay provider.  It records DAC codes, pin writes and accumulated
//! delay so tests can assert on the full hardware history, and it supports
//! fault injection on the current-source error flag and on each device.
//!
//! [`SimPanel`], [`RecordingSink`] and [`StaticParameters`] cover the
//! remaining ports.

use embedded_hal::delay::DelayNs;

use crate::app::events::AppEvent;
use crate::app::ports::{
    AdcGain, AdcPair, DacChannel, DacOutputs, DifferentialAdc, EventSink, GpioExpander, PanelPort,
    ParameterPort, PinDirection,
};
use crate::config::ParameterRecord;
use crate::error::{DeviceError, Error};
use crate::measurement::level::{ATTENUATOR_COEFF, CURRENT_TRANSIMPEDANCE, EMPTY_MARGIN, sensor_resistance};
use crate::pins::{CURRENT_ENABLE_ACTIVE, CURRENT_ENABLE_PIN, CURRENT_FAULT_ACTIVE, CURRENT_FAULT_PIN};

const PIN_COUNT: usize = 8;

/// Sensor current used when synthesizing readings [A].
pub const SIM_SENSOR_CURRENT: f32 = 0.075;

// ── Front end ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimFrontEnd {
    voltage_counts: i16,
    current_counts: i16,
    sensor_fault: bool,
    adc_fails: bool,
    dac_fails: bool,
    gpio_fails: bool,

    levels: [bool; PIN_COUNT],
    directions: [Option<PinDirection>; PIN_COUNT],
    pull_ups: [bool; PIN_COUNT],

    pub dac_writes: Vec<(DacChannel, u16)>,
    pub gpio_writes: Vec<(u8, bool)>,
    pub adc_reads: u32,
    delay_ns: u64,
}

impl Default for SimFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFrontEnd {
    /// All pins high, no current, no faults.
    pub fn new() -> Self {
        Self {
            voltage_counts: 0,
            current_counts: 0,
            sensor_fault: false,
            adc_fails: false,
            dac_fails: false,
            gpio_fails: false,
            levels: [true; PIN_COUNT],
            directions: [None; PIN_COUNT],
            pull_ups: [false; PIN_COUNT],
            dac_writes: Vec::new(),
            gpio_writes: Vec::new(),
            adc_reads: 0,
            delay_ns: 0,
        }
    }

    /// Synthesize readings for a liquid level given as a fraction (0.0–1.0)
    /// at the default gain and calibration.
    pub fn set_level(&mut self, fraction: f32, sensor_length_inch: u8) {
        let ratio = (1.0 - fraction) / EMPTY_MARGIN;
        let sensor_volts = ratio * sensor_resistance(sensor_length_inch) * SIM_SENSOR_CURRENT;
        let lsb = AdcGain::Two.microvolts_per_lsb() * 1e-6;

        self.voltage_counts = (sensor_volts / ATTENUATOR_COEFF / lsb).round() as i16;
        self.current_counts = (SIM_SENSOR_CURRENT * CURRENT_TRANSIMPEDANCE / lsb).round() as i16;
    }

    /// Set the raw conversions of both pairs directly.
    pub fn set_raw_counts(&mut self, voltage: i16, current: i16) {
        self.voltage_counts = voltage;
        self.current_counts = current;
    }

    /// Pull the fault flag low while the source is enabled.
    pub fn inject_sensor_fault(&mut self, fault: bool) {
        self.sensor_fault = fault;
    }

    pub fn fail_adc(&mut self, fail: bool) {
        self.adc_fails = fail;
    }

    pub fn fail_dac(&mut self, fail: bool) {
        self.dac_fails = fail;
    }

    pub fn fail_gpio(&mut self, fail: bool) {
        self.gpio_fails = fail;
    }

    pub fn direction(&self, pin: u8) -> Option<PinDirection> {
        self.directions.get(usize::from(pin)).copied().flatten()
    }

    pub fn pull_up(&self, pin: u8) -> bool {
        self.pull_ups.get(usize::from(pin)).copied().unwrap_or(false)
    }

    /// Last level written to an output pin.
    pub fn pin_level(&self, pin: u8) -> bool {
        self.levels.get(usize::from(pin)).copied().unwrap_or(true)
    }

    pub fn source_enabled(&self) -> bool {
        self.pin_level(CURRENT_ENABLE_PIN) == CURRENT_ENABLE_ACTIVE
    }

    pub fn last_dac(&self, channel: DacChannel) -> Option<u16> {
        self.dac_writes
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|(_, code)| *code)
    }

    pub fn total_delay_ms(&self) -> u64 {
        self.delay_ns / 1_000_000
    }

    fn pin_index(pin: u8) -> Result<usize, DeviceError> {
        let idx = usize::from(pin);
        if idx < PIN_COUNT { Ok(idx) } else { Err(DeviceError::GpioFailed) }
    }
}

impl DifferentialAdc for SimFrontEnd {
    fn read_differential(&mut self, pair: AdcPair, _gain: AdcGain) -> Result<i16, DeviceError> {
        if self.adc_fails {
            return Err(DeviceError::AdcReadFailed);
        }
        self.adc_reads += 1;
        Ok(match pair {
            AdcPair::Ain01 => self.voltage_counts,
            AdcPair::Ain23 => self.current_counts,
        })
    }
}

impl DacOutputs for SimFrontEnd {
    fn set_dac(&mut self, channel: DacChannel, code: u16) -> Result<(), DeviceError> {
        if self.dac_fails {
            return Err(DeviceError::DacWriteFailed);
        }
        self.dac_writes.push((channel, code));
        Ok(())
    }
}

impl GpioExpander for SimFrontEnd {
    fn set_direction(&mut self, pin: u8, direction: PinDirection) -> Result<(), DeviceError> {
        if self.gpio_fails {
            return Err(DeviceError::GpioFailed);
        }
        let idx = Self::pin_index(pin)?;
        self.directions[idx] = Some(direction);
        Ok(())
    }

    fn set_pull_up(&mut self, pin: u8, enabled: bool) -> Result<(), DeviceError> {
        if self.gpio_fails {
            return Err(DeviceError::GpioFailed);
        }
        let idx = Self::pin_index(pin)?;
        self.pull_ups[idx] = enabled;
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<bool, DeviceError> {
        if self.gpio_fails {
            return Err(DeviceError::GpioFailed);
        }
        let idx = Self::pin_index(pin)?;
        if pin == CURRENT_FAULT_PIN {
            let faulted = self.sensor_fault && self.source_enabled();
            return Ok(if faulted { CURRENT_FAULT_ACTIVE } else { !CURRENT_FAULT_ACTIVE });
        }
        Ok(self.levels[idx])
    }

    fn write(&mut self, pin: u8, high: bool) -> Result<(), DeviceError> {
        if self.gpio_fails {
            return Err(DeviceError::GpioFailed);
        }
        let idx = Self::pin_index(pin)?;
        self.levels[idx] = high;
        self.gpio_writes.push((pin, high));
        Ok(())
    }
}

impl DelayNs for SimFrontEnd {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ns += u64::from(ns);
    }
}

// ── Panel ─────────────────────────────────────────────────────

/// Front panel that keeps the last value of every setter.
#[derive(Debug, Clone)]
pub struct SimPanel {
    pub mode_indicator: char,
    pub level: u16,
    pub sensor_error: bool,
    pub timer_remaining: u16,
    pub vacate_bus: bool,
    /// Number of times the bus was vacated.
    pub vacate_count: u32,
    pub led: bool,
    pub led_changes: u32,
}

impl Default for SimPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPanel {
    pub fn new() -> Self {
        Self {
            mode_indicator: ' ',
            level: 0,
            sensor_error: false,
            timer_remaining: 0,
            vacate_bus: false,
            vacate_count: 0,
            led: false,
            led_changes: 0,
        }
    }
}

impl PanelPort for SimPanel {
    fn set_mode_indicator(&mut self, indicator: char) {
        self.mode_indicator = indicator;
    }

    fn set_level(&mut self, level: u16) {
        self.level = level;
    }

    fn set_sensor_error(&mut self, error: bool) {
        self.sensor_error = error;
    }

    fn set_timer_remaining(&mut self, minutes: u16) {
        self.timer_remaining = minutes;
    }

    fn set_vacate_bus(&mut self, vacate: bool) {
        if vacate && !self.vacate_bus {
            self.vacate_count += 1;
        }
        self.vacate_bus = vacate;
    }

    fn set_led(&mut self, on: bool) {
        if on != self.led {
            self.led_changes += 1;
        }
        self.led = on;
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Parameters ────────────────────────────────────────────────

/// Parameter store backed by an in-memory record.
#[derive(Debug, Clone, Default)]
pub struct StaticParameters(pub ParameterRecord);

impl ParameterPort for StaticParameters {
    fn load(&self) -> Result<ParameterRecord, Error> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}
