//! Level computation from averaged differential readings.
//!
//! ```text
//!   V_sensor = counts(AIN0-1) × µV/LSB × gain_cal × ATTENUATOR_COEFF
//!   I_sensor = counts(AIN2-3) × µV/LSB × gain_cal / CURRENT_TRANSIMPEDANCE
//!   ratio    = (V_sensor / I_sensor) / (length × SENSOR_UNIT_IMPEDANCE)
//!   raw      = 1 − ratio × EMPTY_MARGIN
//! ```
//!
//! The heated section of the sensor sits above the liquid, so a fully dry
//! sensor reads its nominal resistance (ratio 1) and a fully immersed one
//! reads close to zero.

use log::debug;

use crate::app::ports::{AdcGain, AdcPair, DifferentialAdc};
use crate::config::LEVEL_FULL_SCALE;
use crate::error::{ConfigError, DeviceError, SensorError};

/// Sensor wire impedance per unit length [Ω/inch].
pub const SENSOR_UNIT_IMPEDANCE: f32 = 11.6;
/// Current-sense transimpedance [V/A].
pub const CURRENT_TRANSIMPEDANCE: f32 = 20.0;
/// Inverse of the voltage attenuator ratio.
pub const ATTENUATOR_COEFF: f32 = 24.6642;
/// Keeps resistance tolerance from reading a false non-zero level when empty.
pub const EMPTY_MARGIN: f32 = 1.02;

/// Nominal sensor resistance [Ω].
pub fn sensor_resistance(sensor_length_inch: u8) -> f32 {
    f32::from(sensor_length_inch) * SENSOR_UNIT_IMPEDANCE
}

/// Average `count` offset-corrected conversions of one pair [LSB].
pub fn average_counts(
    adc: &mut impl DifferentialAdc,
    pair: AdcPair,
    gain: AdcGain,
    offset: i16,
    count: u16,
) -> Result<f32, DeviceError> {
    let count = count.max(1);
    let mut sum: i32 = 0;
    for _ in 0..count {
        let raw = adc.read_differential(pair, gain)?;
        sum += i32::from(raw) - i32::from(offset);
    }
    Ok(sum as f32 / f32::from(count))
}

/// Convert averaged counts to volts at the ADC input.
pub fn counts_to_volts(counts: f32, gain: AdcGain, gain_correction: f32) -> f32 {
    counts * gain.microvolts_per_lsb() * 1e-6 * gain_correction
}

/// Unscaled level [0.1 %], clamped to 0–1000.
pub fn raw_level(voltage: f32, current: f32, sensor_length_inch: u8) -> Result<u16, SensorError> {
    if sensor_length_inch == 0 {
        return Err(SensorError::ZeroResistance);
    }
    if current <= 0.0 {
        return Err(SensorError::NoCurrent);
    }

    let ratio = (voltage / current) / sensor_resistance(sensor_length_inch);
    let fraction = 1.0 - ratio * EMPTY_MARGIN;
    debug!("Level: V={:.4} V I={:.5} A ratio={:.4} raw={:.4}", voltage, current, ratio, fraction);

    Ok(to_permille(fraction))
}

fn to_permille(fraction: f32) -> u16 {
    let permille = (fraction * f32::from(LEVEL_FULL_SCALE)).round();
    permille.clamp(0.0, f32::from(LEVEL_FULL_SCALE)) as u16
}

/// Remap `raw` linearly so `low` reads 0 % and `high` reads 100 %.
///
/// Bounds are in 0.1 % units.  Inverted, equal or over-range bounds are
/// rejected and the caller keeps the raw level.
pub fn scale(raw: u16, high: u16, low: u16) -> Result<u16, ConfigError> {
    if high <= low || high > LEVEL_FULL_SCALE {
        return Err(ConfigError::InvalidScale { high, low });
    }

    let span = i32::from(high) - i32::from(low);
    let scaled = (i32::from(raw) - i32::from(low)) * i32::from(LEVEL_FULL_SCALE) / span;
    Ok(scaled.clamp(0, i32::from(LEVEL_FULL_SCALE)) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdc {
        values: [i16; 2],
        reads: u16,
    }

    impl DifferentialAdc for FixedAdc {
        fn read_differential(&mut self, pair: AdcPair, _gain: AdcGain) -> Result<i16, DeviceError> {
            self.reads += 1;
            Ok(match pair {
                AdcPair::Ain01 => self.values[0],
                AdcPair::Ain23 => self.values[1],
            })
        }
    }

    #[test]
    fn averaging_subtracts_offset_per_sample() {
        let mut adc = FixedAdc { values: [1000, -200], reads: 0 };
        let v = average_counts(&mut adc, AdcPair::Ain01, AdcGain::Two, 10, 10).unwrap();
        assert!((v - 990.0).abs() < f32::EPSILON);
        assert_eq!(adc.reads, 10);

        let i = average_counts(&mut adc, AdcPair::Ain23, AdcGain::Two, -20, 4).unwrap();
        assert!((i + 180.0).abs() < f32::EPSILON);
    }

    #[test]
    fn dry_sensor_reads_empty() {
        // Full nominal resistance: ratio 1, raw clamps at 0.
        let r = sensor_resistance(20);
        let current = 0.075;
        assert_eq!(raw_level(r * current, current, 20), Ok(0));
    }

    #[test]
    fn half_immersed_sensor() {
        let r = sensor_resistance(20);
        let current = 0.075;
        let ratio = 0.5 / EMPTY_MARGIN;
        assert_eq!(raw_level(ratio * r * current, current, 20), Ok(500));
    }

    #[test]
    fn degenerate_inputs_are_sensor_errors() {
        assert_eq!(raw_level(1.0, 0.0, 20), Err(SensorError::NoCurrent));
        assert_eq!(raw_level(1.0, 0.1, 0), Err(SensorError::ZeroResistance));
    }

    #[test]
    fn scale_maps_bounds_onto_full_range() {
        assert_eq!(scale(500, 800, 200), Ok(500));
        assert_eq!(scale(200, 800, 200), Ok(0));
        assert_eq!(scale(800, 800, 200), Ok(1000));
        assert_eq!(scale(100, 800, 200), Ok(0));
        assert_eq!(scale(950, 800, 200), Ok(1000));
        assert_eq!(scale(437, 1000, 0), Ok(437));
    }

    #[test]
    fn scale_rejects_bad_bounds() {
        assert_eq!(
            scale(500, 200, 800),
            Err(ConfigError::InvalidScale { high: 200, low: 800 })
        );
        assert!(scale(500, 400, 400).is_err());
        assert!(scale(500, 1001, 0).is_err());
    }
}
