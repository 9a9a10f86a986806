//! Measurement engine: current source, sample cadence, level and monitor.
//!
//! ```text
//!              START (MANUAL)            final sample
//!   ┌──────┐ ─────────────────▶ ┌────────────────────┐ ──────────────▶ ┌──────┐
//!   │ IDLE │                    │ ACQUIRING (single) │                 │ IDLE │
//!   └──────┘ ─────────────────▶ ├────────────────────┤ ── STOP ──────▶ └──────┘
//!              START (CONT)     │ ACQUIRING (cont)   │ ── fault ─────▶ (failure code,
//!                               └────────────────────┘                  one-shot flag)
//! ```
//!
//! The engine never blocks across ticks.  [`MeasurementEngine::clk_in`]
//! only advances the cadence counters and raises `should_measure`; the
//! orchestrator calls [`MeasurementEngine::execute_measurement`] in the
//! same tick.  The only synchronous waits are the settling delays inside
//! the current source when a measurement starts.

pub mod cadence;
pub mod current_source;
pub mod level;
pub mod monitor;

use log::{debug, info, warn};

use crate::app::ports::{AdcPair, DacChannel, MeasurementHardware};
use crate::config::{InstrumentConfig, ParameterRecord};
use crate::error::{CommandError, Error, Result};
use crate::fsm::{MeasCommand, Mode};

use cadence::{ContinuousCadence, SampleRequest, SingleShotCadence};
use current_source::CurrentSource;
use level::{ATTENUATOR_COEFF, CURRENT_TRANSIMPEDANCE};
use monitor::{MONITOR_FAILURE_CODE, monitor_code};

/// Acquisition phase.
#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Single(SingleShotCadence),
    Continuous(ContinuousCadence),
}

/// How an acquisition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The designated final sample was taken.
    Completed,
    /// Current-source fault or device error.
    Failed,
    /// Explicit STOP.
    Stopped,
}

/// Drives one sensor through its measurement sessions.
///
/// Holds a read-only reference to the parameter record; the record is
/// never modified here.
pub struct MeasurementEngine<'p> {
    params: &'p ParameterRecord,
    config: InstrumentConfig,
    source: CurrentSource,
    phase: Phase,
    mode: Mode,

    // --- Session state ---
    sensor_error: bool,
    busy: bool,
    should_measure: bool,
    /// The next executed sample is the designated final one.
    final_pending: bool,
    last_level: u16,
    last_raw: u16,
    result_ready: bool,
    finished: bool,
    failed: bool,
    bus_occupied: bool,
}

impl<'p> MeasurementEngine<'p> {
    pub fn new(params: &'p ParameterRecord, config: InstrumentConfig) -> Self {
        Self {
            params,
            config,
            source: CurrentSource::new(),
            phase: Phase::Idle,
            mode: Mode::Timer,
            sensor_error: false,
            busy: false,
            should_measure: false,
            final_pending: false,
            last_level: 0,
            last_raw: 0,
            result_ready: false,
            finished: false,
            failed: false,
            bus_occupied: false,
        }
    }

    /// Configure the current-source pins.  The source is left off.
    pub fn init(&mut self, hw: &mut impl MeasurementHardware) -> Result<()> {
        let length = self.params.sensor_length_inch;
        info!(
            "Measurement: sensor {} inch, R={:.1} ohm, propagation {} ms",
            length,
            level::sensor_resistance(length),
            cadence::propagation_ms(length)
        );
        self.source.init(hw).map_err(|e| {
            log::error!("Measurement: current source pin setup failed: {}", e);
            Error::from(e)
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Apply a command from the mode machine.
    ///
    /// START is refused while busy or in TIMER mode.  A START whose
    /// current source faults is accepted: the session ends immediately
    /// with the failure flag raised.  STOP is always accepted.
    pub fn set_command(&mut self, command: MeasCommand, hw: &mut impl MeasurementHardware) -> Result<()> {
        match command {
            MeasCommand::Idle => {
                debug!(
                    "Measurement: IDLE (busy={} error={} mode={})",
                    self.busy,
                    self.sensor_error,
                    self.mode.name()
                );
                Ok(())
            }
            MeasCommand::Start => self.start(hw),
            MeasCommand::Stop => {
                self.terminate(hw, Outcome::Stopped);
                Ok(())
            }
        }
    }

    fn start(&mut self, hw: &mut impl MeasurementHardware) -> Result<()> {
        if self.busy {
            warn!("Measurement: START rejected, measurement in progress");
            return Err(CommandError::Busy.into());
        }

        let phase = match self.mode {
            Mode::Timer => {
                warn!("Measurement: START rejected in TIMER mode");
                return Err(CommandError::NotAcquiringMode.into());
            }
            Mode::Manual => Phase::Single(SingleShotCadence::new(self.params.sensor_length_inch, &self.config)),
            Mode::Continuous => {
                Phase::Continuous(ContinuousCadence::new(self.config.ticks(self.config.continuous_interval_ms)))
            }
        };

        self.reset_session();
        self.busy = true;
        self.phase = phase;
        info!("Measurement: {} start", self.mode.name());

        if let Err(e) = self.source.on(hw, self.params.current_setpoint) {
            warn!("Measurement: cannot energize sensor: {}", e);
            self.sensor_error = true;
            self.terminate(hw, Outcome::Failed);
        }
        Ok(())
    }

    fn reset_session(&mut self) {
        self.sensor_error = false;
        self.should_measure = false;
        self.final_pending = false;
        self.result_ready = false;
        self.finished = false;
        self.failed = false;
        self.bus_occupied = false;
    }

    /// End the acquisition: de-energize, go idle, clear busy.
    ///
    /// `sensor_error` is left as is.
    pub fn terminate(&mut self, hw: &mut impl MeasurementHardware, outcome: Outcome) {
        self.source.off(hw);
        let was_acquiring = !matches!(self.phase, Phase::Idle);
        self.phase = Phase::Idle;
        self.busy = false;
        self.should_measure = false;
        self.final_pending = false;
        self.mode = Mode::Timer;

        match outcome {
            Outcome::Failed => {
                self.failed = true;
                if let Err(e) = hw.set_dac(DacChannel::Monitor, MONITOR_FAILURE_CODE) {
                    warn!("Measurement: monitor failure code not written: {}", e);
                }
                warn!("Measurement: terminated on sensor error");
            }
            Outcome::Completed => info!("Measurement: single shot complete ({} x0.1 %)", self.last_level),
            Outcome::Stopped if was_acquiring => info!("Measurement: stopped"),
            Outcome::Stopped => debug!("Measurement: STOP while idle"),
        }
    }

    // -----------------------------------------------------------------------
    // Per-tick work
    // -----------------------------------------------------------------------

    /// Advance the cadence counters.  Raises `should_measure` when a sample is due.
    pub fn clk_in(&mut self) {
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Single(cadence) => match cadence.clk_in() {
                Some(SampleRequest::Regular) => self.should_measure = true,
                Some(SampleRequest::Final) => {
                    self.should_measure = true;
                    self.final_pending = true;
                }
                None => {}
            },
            Phase::Continuous(cadence) => {
                if cadence.clk_in() {
                    self.should_measure = true;
                }
            }
        }
    }

    /// Take one sample.
    ///
    /// The request flag is cleared first so a request raised meanwhile is
    /// not lost.  A fault or device error ends the session as failed.  The
    /// designated final sample always ends the session.
    pub fn execute_measurement(&mut self, hw: &mut impl MeasurementHardware) {
        self.should_measure = false;
        if matches!(self.phase, Phase::Idle) {
            return;
        }
        let is_final = core::mem::take(&mut self.final_pending);

        self.bus_occupied = true;
        let failed = if self.source.status(hw) {
            match self.acquire(hw) {
                Ok(()) => false,
                Err(e) => {
                    warn!("Measurement: sample failed: {}", e);
                    true
                }
            }
        } else {
            warn!("Measurement: current source fault");
            true
        };
        self.bus_occupied = false;

        if failed {
            self.sensor_error = true;
        }
        if is_final {
            self.finished = true;
        }
        match (failed, is_final) {
            (true, _) => self.terminate(hw, Outcome::Failed),
            (false, true) => self.terminate(hw, Outcome::Completed),
            (false, false) => {}
        }
    }

    /// Read, scale and publish one level.
    fn acquire(&mut self, hw: &mut impl MeasurementHardware) -> Result<()> {
        let p = self.params;
        let cfg = &self.config;

        let v_counts = level::average_counts(hw, AdcPair::Ain01, cfg.voltage_gain, p.adc_offset_voltage, cfg.adc_average)?;
        let i_counts = level::average_counts(hw, AdcPair::Ain23, cfg.current_gain, p.adc_offset_current, cfg.adc_average)?;
        let voltage = level::counts_to_volts(v_counts, cfg.voltage_gain, p.adc_gain_voltage) * ATTENUATOR_COEFF;
        let current = level::counts_to_volts(i_counts, cfg.current_gain, p.adc_gain_current) / CURRENT_TRANSIMPEDANCE;

        let raw = level::raw_level(voltage, current, p.sensor_length_inch)?;
        let scaled = match level::scale(raw, p.scale_high, p.scale_low) {
            Ok(v) => v,
            Err(e) => {
                warn!("Measurement: {}, reporting unscaled level", e);
                raw
            }
        };

        hw.set_dac(DacChannel::Monitor, monitor_code(scaled, p.vmon_dac_offset))?;

        debug!("Measurement: raw={} level={}", raw, scaled);
        self.last_raw = raw;
        self.last_level = scaled;
        self.result_ready = true;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        !self.busy
    }

    pub fn should_measure(&self) -> bool {
        self.should_measure
    }

    pub fn is_sensor_error(&self) -> bool {
        self.sensor_error
    }

    /// Read-and-clear: a new level is available.
    pub fn is_result_ready(&mut self) -> bool {
        core::mem::take(&mut self.result_ready)
    }

    /// Latest level [0.1 %].
    pub fn result(&self) -> u16 {
        self.last_level
    }

    /// Latest unscaled level [0.1 %].
    pub fn raw_result(&self) -> u16 {
        self.last_raw
    }

    /// Read-and-clear: a single shot reached its final sample.
    pub fn have_finished_measurement(&mut self) -> bool {
        core::mem::take(&mut self.finished)
    }

    /// Read-and-clear: the last session ended on a sensor error.
    pub fn have_failed_measurement(&mut self) -> bool {
        core::mem::take(&mut self.failed)
    }

    /// Other bus users must skip their transactions while this is set.
    pub fn should_vacate_bus(&self) -> bool {
        self.bus_occupied || self.should_measure
    }

    pub fn is_current_on(&self) -> bool {
        self.source.is_enabled()
    }

    /// Single shot is past its propagation window.
    pub fn is_final_phase(&self) -> bool {
        match &self.phase {
            Phase::Single(cadence) => cadence.is_final_phase(),
            Phase::Idle | Phase::Continuous(_) => false,
        }
    }
}
