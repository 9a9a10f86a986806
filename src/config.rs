//! Instrument configuration and the external parameter record.
//!
//! [`ParameterRecord`] is owned by the non-volatile parameter store and is
//! only ever read by the core.  [`InstrumentConfig`] carries the build-time
//! tunables (tick rate, cadences, averaging) and converts them to tick counts.

use serde::{Deserialize, Serialize};

use crate::app::ports::AdcGain;
use crate::error::{ConfigError, Result};

/// Longest accepted interval-timer period [min].
pub const MAX_TIMER_PERIOD_MIN: u16 = 90;

/// Full scale of a level expressed in 0.1 % units.
pub const LEVEL_FULL_SCALE: u16 = 1000;

/// Calibration and configuration record supplied by the parameter store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    // --- Sensor ---
    /// Physical sensor length [inch].
    pub sensor_length_inch: u8,

    // --- Timer ---
    /// Interval timer period [min]; 0 disables the timer.
    pub timer_period_min: u16,

    // --- Scaling ---
    /// Raw level mapped to 100.0 % [0.1 %].
    pub scale_high: u16,
    /// Raw level mapped to 0.0 % [0.1 %].
    pub scale_low: u16,

    // --- ADC calibration ---
    /// Offset of the voltage pair (AIN0-AIN1) [LSB].
    pub adc_offset_voltage: i16,
    /// Offset of the current pair (AIN2-AIN3) [LSB].
    pub adc_offset_current: i16,
    /// Gain correction multiplier of the voltage pair.
    pub adc_gain_voltage: f32,
    /// Gain correction multiplier of the current pair.
    pub adc_gain_current: f32,

    // --- Outputs ---
    /// Current-source setpoint [0.1 mA].
    pub current_setpoint: u16,
    /// Monitor DAC error at the 0.1 V output point [LSB].
    pub vmon_dac_offset: i16,

    // --- Identity ---
    pub serial_number: heapless::String<16>,
}

impl Default for ParameterRecord {
    fn default() -> Self {
        let mut serial_number = heapless::String::new();
        let _ = serial_number.push_str("EH900-0000");
        Self {
            sensor_length_inch: 20,
            timer_period_min: 60,
            scale_high: LEVEL_FULL_SCALE,
            scale_low: 0,
            adc_offset_voltage: 0,
            adc_offset_current: 0,
            adc_gain_voltage: 1.0,
            adc_gain_current: 1.0,
            current_setpoint: 750, // 75.0 mA
            vmon_dac_offset: 0,
            serial_number,
        }
    }
}

impl ParameterRecord {
    /// Range-check the record as loaded from the store.
    pub fn validate(&self) -> Result<()> {
        if self.sensor_length_inch == 0 {
            return Err(ConfigError::ValidationFailed("sensor length must be non-zero").into());
        }
        if self.timer_period_min > MAX_TIMER_PERIOD_MIN {
            return Err(ConfigError::TimerPeriodOutOfRange(self.timer_period_min).into());
        }
        if !self.adc_gain_voltage.is_finite() || !self.adc_gain_current.is_finite() {
            return Err(ConfigError::ValidationFailed("ADC gain correction not finite").into());
        }
        if self.serial_number.is_empty() || !self.serial_number.is_ascii() {
            return Err(ConfigError::ValidationFailed("serial number must be non-empty ASCII").into());
        }
        Ok(())
    }
}

/// Build-time tunables of the control core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    // --- Timing ---
    /// Scheduler tick period [ms].
    pub tick_period_ms: u32,
    /// Sampling period in continuous mode [ms].
    pub continuous_interval_ms: u32,
    /// Single-shot interval used when three samples do not fit the window [ms].
    pub short_sensor_interval_ms: u32,
    /// Ticks after the propagation window before the final sample.
    pub final_margin_ticks: u32,

    // --- Acquisition ---
    /// Raw conversions averaged per reading.
    pub adc_average: u16,
    pub voltage_gain: AdcGain,
    pub current_gain: AdcGain,

    // --- Front panel ---
    /// Hold time that turns a click into a long press [ms].
    pub long_press_ms: u32,
    /// LED blink half-period [ms].
    pub led_blink_ms: u32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_period_ms: 10, // 100 Hz
            continuous_interval_ms: 1000,
            short_sensor_interval_ms: 500,
            final_margin_ticks: 2,

            // Acquisition
            adc_average: 10, // ~100 ms per reading
            voltage_gain: AdcGain::Two,
            current_gain: AdcGain::Two,

            // Front panel
            long_press_ms: 2000,
            led_blink_ms: 500,
        }
    }
}

impl InstrumentConfig {
    /// Convert a duration to whole ticks (at least one).
    ///
    /// A zero tick period yields one tick; [`validate`](Self::validate)
    /// rejects it before the instrument starts.
    pub fn ticks(&self, ms: u32) -> u32 {
        ms.checked_div(self.tick_period_ms).unwrap_or(0).max(1)
    }

    /// Ticks per minute, or 0 for a zero tick period.
    pub fn ticks_per_minute(&self) -> u32 {
        60_000u32.checked_div(self.tick_period_ms).unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 || 60_000 % self.tick_period_ms != 0 {
            return Err(ConfigError::ValidationFailed("tick period must divide one minute").into());
        }
        if self.adc_average == 0 {
            return Err(ConfigError::ValidationFailed("ADC averaging count must be non-zero").into());
        }
        if self.continuous_interval_ms < self.tick_period_ms {
            return Err(ConfigError::ValidationFailed("continuous interval shorter than a tick").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = InstrumentConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.ticks_per_minute(), 6000);
        assert_eq!(c.ticks(c.continuous_interval_ms), 100);
        assert_eq!(c.ticks(c.short_sensor_interval_ms), 50);
        assert_eq!(c.ticks(c.long_press_ms), 200);

        let p = ParameterRecord::default();
        assert!(p.validate().is_ok());
        assert!(p.scale_high >= p.scale_low);
    }

    #[test]
    fn tick_period_must_divide_a_minute() {
        let c = InstrumentConfig {
            tick_period_ms: 7,
            ..InstrumentConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn record_rejects_zero_length_and_long_timer() {
        let p = ParameterRecord {
            sensor_length_inch: 0,
            ..ParameterRecord::default()
        };
        assert!(p.validate().is_err());

        let p = ParameterRecord {
            timer_period_min: 120,
            ..ParameterRecord::default()
        };
        assert_eq!(
            p.validate(),
            Err(ConfigError::TimerPeriodOutOfRange(120).into())
        );
    }

    #[test]
    fn serde_roundtrip() {
        let p = ParameterRecord::default();
        let json = serde_json::to_string(&p).unwrap();
        let p2: ParameterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(p, p2);

        let c = InstrumentConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: InstrumentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn zero_tick_period_converts_without_panic() {
        let c = InstrumentConfig {
            tick_period_ms: 0,
            ..InstrumentConfig::default()
        };
        assert_eq!(c.ticks(1000), 1);
        assert_eq!(c.ticks_per_minute(), 0);
        assert!(matches!(
            c.validate(),
            Err(crate::error::Error::Config(ConfigError::ValidationFailed(_)))
        ));
    }
}
