//! Analog level monitor output.
//!
//! 0.0 % drives 0.1 V and 100.0 % drives 1.1 V; 0 V is reserved for a
//! failed measurement.

use crate::config::LEVEL_FULL_SCALE;

/// Monitor DAC counts per volt (2.5 V full scale).
pub const MONITOR_COUNTS_PER_VOLT: f32 = 26214.0;
/// Output at 0.0 % [V].
pub const MONITOR_ZERO_VOLTS: f32 = 0.1;
/// Output span for 0–100.0 % [V].
pub const MONITOR_SPAN_VOLTS: f32 = 1.0;
/// Code issued when a measurement ends on a sensor error.
pub const MONITOR_FAILURE_CODE: u16 = 0;

/// DAC code for a level [0.1 %] with the unit's offset correction.
///
/// Levels above 100.0 % are clamped.
pub fn monitor_code(level: u16, offset: i16) -> u16 {
    let level = level.min(LEVEL_FULL_SCALE);
    let volts = MONITOR_ZERO_VOLTS + MONITOR_SPAN_VOLTS * f32::from(level) / f32::from(LEVEL_FULL_SCALE);
    let code = (volts * MONITOR_COUNTS_PER_VOLT).round() as i32 + i32::from(offset);
    code.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(monitor_code(0, 0), 2621);
        assert_eq!(monitor_code(1000, 0), 28835);
        assert_eq!(monitor_code(500, 0), 15728);
    }

    #[test]
    fn over_range_clamps_to_full_scale() {
        assert_eq!(monitor_code(1234, 0), monitor_code(1000, 0));
    }

    #[test]
    fn offset_is_applied_and_saturates() {
        assert_eq!(monitor_code(0, -21), 2600);
        assert_eq!(monitor_code(0, i16::MIN), 0);
        assert_ne!(monitor_code(0, 0), MONITOR_FAILURE_CODE);
    }
}
