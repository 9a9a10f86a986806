//! Sensor current source: setpoint DAC, enable line and fault flag.
//!
//! The enable line is active LOW on the GPIO expander; the fault flag
//! reads LOW when the sensor is open or shorted.  Energizing blocks for
//! the two settling delays (10 ms before the fault check, 100 ms after).

use log::{info, warn};

use crate::app::ports::{DacChannel, MeasurementHardware, PinDirection};
use crate::error::{DeviceError, Error, SensorError};
use crate::pins::{
    CURRENT_ENABLE_ACTIVE, CURRENT_ENABLE_PIN, CURRENT_FAULT_ACTIVE, CURRENT_FAULT_PIN,
    CURRENT_STABILIZE_MS, FAULT_SETTLE_MS,
};

/// Source transconductance [mA/V].
pub const SOURCE_MA_PER_VOLT: u32 = 56;
/// Setpoint DAC counts per volt (12-bit, 3.3 V reference).
pub const SETPOINT_DAC_COUNTS_PER_VOLT: u32 = 1241;
const SETPOINT_DAC_MAX: u32 = 0x0FFF;

/// Setpoint DAC code for a current in 0.1 mA units.
pub fn setpoint_code(setpoint_tenth_ma: u16) -> u16 {
    let code = u32::from(setpoint_tenth_ma) * SETPOINT_DAC_COUNTS_PER_VOLT / (SOURCE_MA_PER_VOLT * 10);
    code.min(SETPOINT_DAC_MAX) as u16
}

#[derive(Debug, Clone, Default)]
pub struct CurrentSource {
    enabled: bool,
    fault_latched: bool,
}

impl CurrentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the expander pins and leave the source off.
    pub fn init(&mut self, hw: &mut impl MeasurementHardware) -> Result<(), DeviceError> {
        hw.set_direction(CURRENT_FAULT_PIN, PinDirection::Input)?;
        hw.set_pull_up(CURRENT_FAULT_PIN, true)?;
        hw.set_direction(CURRENT_ENABLE_PIN, PinDirection::Output)?;
        hw.write(CURRENT_ENABLE_PIN, !CURRENT_ENABLE_ACTIVE)?;
        self.enabled = false;
        self.fault_latched = false;
        Ok(())
    }

    /// Load the setpoint, energize and check the fault flag.
    ///
    /// On a fault the source is switched back off before returning.
    pub fn on(&mut self, hw: &mut impl MeasurementHardware, setpoint_tenth_ma: u16) -> Result<(), Error> {
        self.fault_latched = false;
        let code = setpoint_code(setpoint_tenth_ma);
        hw.set_dac(DacChannel::CurrentSetpoint, code)?;
        hw.write(CURRENT_ENABLE_PIN, CURRENT_ENABLE_ACTIVE)?;
        self.enabled = true;

        hw.delay_ms(FAULT_SETTLE_MS);
        let faulted = match hw.read(CURRENT_FAULT_PIN) {
            Ok(level) => level == CURRENT_FAULT_ACTIVE,
            Err(e) => {
                warn!("CurrentSource: fault flag unreadable: {}", e);
                true
            }
        };
        if faulted {
            self.fault_latched = true;
            self.off(hw);
            warn!("CurrentSource: fault on energize");
            return Err(SensorError::CurrentSourceFault.into());
        }

        hw.delay_ms(CURRENT_STABILIZE_MS);
        info!("CurrentSource: on ({} x0.1 mA, DAC {})", setpoint_tenth_ma, code);
        Ok(())
    }

    /// De-assert the enable line.  The source is considered off even if
    /// the expander write fails.
    pub fn off(&mut self, hw: &mut impl MeasurementHardware) {
        if let Err(e) = hw.write(CURRENT_ENABLE_PIN, !CURRENT_ENABLE_ACTIVE) {
            warn!("CurrentSource: disable write failed: {}", e);
        }
        if self.enabled {
            info!("CurrentSource: off");
        }
        self.enabled = false;
    }

    /// Poll the fault flag.  `true` iff enabled and no fault is latched.
    pub fn status(&mut self, hw: &mut impl MeasurementHardware) -> bool {
        if !self.enabled {
            return false;
        }
        match hw.read(CURRENT_FAULT_PIN) {
            Ok(level) if level == CURRENT_FAULT_ACTIVE => self.fault_latched = true,
            Ok(_) => {}
            Err(e) => {
                warn!("CurrentSource: fault flag unreadable: {}", e);
                self.fault_latched = true;
            }
        }
        !self.fault_latched
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_fault_latched(&self) -> bool {
        self.fault_latched
    }
}
