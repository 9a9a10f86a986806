//! Instrument service: the tick orchestrator.
//!
//! [`Instrument`] owns the interval timer, mode machine, measurement
//! engine and the front-panel peers.  It exposes a hardware-agnostic
//! step function; all I/O flows through port traits injected at call
//! sites, making the whole control core testable with simulated adapters.
//!
//! ```text
//!  switch level ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │          Instrument          │
//!  Measurement- ◀──▶│ Timer · Modes · Engine · LED │ ──▶ PanelPort
//!  Hardware         └──────────────────────────────┘
//! ```
//!
//! Order within one tick (fixed, so a completion raised this tick reaches
//! the mode machine in the same tick):
//!
//! 1. advance the interval timer
//! 2. advance the measurement cadence, vacate the bus if a sample is due
//! 3. execute the sample
//! 4. deliver signals: measurement error, measurement complete, switch,
//!    timer expiry, injected
//! 5. forward the resulting command to the engine
//! 6. refresh the status LED

use heapless::Deque;
use log::{info, warn};

use crate::config::{InstrumentConfig, ParameterRecord};
use crate::drivers::led::{LedPattern, StatusLed};
use crate::drivers::switch::{SwitchEvent, SwitchInput};
use crate::error::{CommandError, Result};
use crate::fsm::{MeasCommand, Mode, ModeMachine, TransitionSignal};
use crate::measurement::MeasurementEngine;
use crate::scheduler::IntervalTimer;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, MeasurementHardware, PanelPort};

/// Signals queued by [`AppCommand::Inject`] between ticks.
const INJECT_QUEUE_LEN: usize = 4;
/// Signals delivered within one tick.
const TICK_QUEUE_LEN: usize = 16;

type SignalQueue<const N: usize> = Deque<TransitionSignal, N>;

// ───────────────────────────────────────────────────────────────
// Instrument
// ───────────────────────────────────────────────────────────────

pub struct Instrument<'p> {
    params: &'p ParameterRecord,
    config: InstrumentConfig,
    timer: IntervalTimer,
    machine: ModeMachine,
    engine: MeasurementEngine<'p>,
    switch: SwitchInput,
    led: StatusLed,
    injected: SignalQueue<INJECT_QUEUE_LEN>,
    tick_count: u64,
}

impl<'p> Instrument<'p> {
    /// Construct the instrument.  Nothing touches hardware until [`start`](Self::start).
    pub fn new(params: &'p ParameterRecord, config: InstrumentConfig) -> Self {
        let timer = IntervalTimer::new(config.ticks_per_minute());
        let switch = SwitchInput::new(config.ticks(config.long_press_ms));
        let engine = MeasurementEngine::new(params, config.clone());

        Self {
            params,
            config,
            timer,
            machine: ModeMachine::new(),
            engine,
            switch,
            led: StatusLed::new(),
            injected: Deque::new(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate configuration, arm the timer, set up the current source
    /// and take ownership of the switch and LED.
    pub fn start(
        &mut self,
        hw: &mut impl MeasurementHardware,
        panel: &mut impl PanelPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.config.validate()?;
        self.params.validate()?;

        self.timer.init(self.params.timer_period_min)?;
        self.engine.init(hw)?;

        let blink = self.config.ticks(self.config.led_blink_ms);
        if let Err(e) = self.led.set_blink_period(u16::try_from(blink).unwrap_or(u16::MAX)) {
            warn!("Instrument: {}", e);
        }
        let switch_owned = self.switch.acquire();
        let led_owned = self.led.acquire();
        if !switch_owned {
            warn!("Instrument: switch already owned");
        }
        if !led_owned {
            warn!("Instrument: status LED already owned");
        }

        let mode = self.machine.mode();
        panel.set_mode_indicator(mode.indicator());
        panel.set_timer_remaining(self.timer.remaining_time());
        panel.set_sensor_error(false);
        panel.set_level(self.engine.result());
        panel.set_led(false);

        sink.emit(&AppEvent::Started(mode));
        info!(
            "Instrument {} started in {} (timer {} min)",
            self.params.serial_number,
            mode.name(),
            self.timer.period()
        );
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one tick.  `switch_level` is the sampled front-panel switch.
    pub fn tick(
        &mut self,
        switch_level: bool,
        hw: &mut impl MeasurementHardware,
        panel: &mut impl PanelPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Interval timer
        self.timer.clk_in();
        if self.timer.has_lapsed_one_minute() {
            let remaining = self.timer.remaining_time();
            panel.set_timer_remaining(remaining);
            sink.emit(&AppEvent::TimerMinuteElapsed { remaining });
        }
        let timer_expired = self.timer.has_overflow();

        // 2. Measurement cadence
        self.engine.clk_in();
        panel.set_vacate_bus(self.engine.should_vacate_bus());

        // 3. Sample
        if self.engine.should_measure() {
            self.engine.execute_measurement(hw);
            panel.set_vacate_bus(self.engine.should_vacate_bus());
            if self.engine.is_result_ready() {
                let level = self.engine.result();
                panel.set_level(level);
                sink.emit(&AppEvent::LevelMeasured {
                    level,
                    raw: self.engine.raw_result(),
                });
            }
            panel.set_sensor_error(self.engine.is_sensor_error());
        }

        // 4. Signals, in delivery order
        let mut signals = SignalQueue::<TICK_QUEUE_LEN>::new();
        self.collect_engine_signals(&mut signals, panel, sink);
        match self.switch.clk_in(switch_level) {
            Some(SwitchEvent::Click) => enqueue(&mut signals, TransitionSignal::Click),
            Some(SwitchEvent::LongPress) => enqueue(&mut signals, TransitionSignal::LongPress),
            None => {}
        }
        if timer_expired {
            info!("Instrument: timer expired");
            enqueue(&mut signals, TransitionSignal::TimerExpired);
        }
        while let Some(signal) = self.injected.pop_front() {
            enqueue(&mut signals, signal);
        }

        // 5. Deliver and forward commands
        while let Some(signal) = signals.pop_front() {
            self.deliver(signal, &mut signals, hw, panel, sink);
        }

        // 6. Status LED
        self.refresh_led(panel);
    }

    fn collect_engine_signals(
        &mut self,
        signals: &mut SignalQueue<TICK_QUEUE_LEN>,
        panel: &mut impl PanelPort,
        sink: &mut impl EventSink,
    ) {
        if self.engine.have_failed_measurement() {
            panel.set_sensor_error(true);
            sink.emit(&AppEvent::SensorFault);
            enqueue(signals, TransitionSignal::MeasurementError);
        }
        if self.engine.have_finished_measurement() {
            sink.emit(&AppEvent::MeasurementFinished {
                level: self.engine.result(),
            });
            enqueue(signals, TransitionSignal::MeasurementComplete);
        }
    }

    fn deliver(
        &mut self,
        signal: TransitionSignal,
        signals: &mut SignalQueue<TICK_QUEUE_LEN>,
        hw: &mut impl MeasurementHardware,
        panel: &mut impl PanelPort,
        sink: &mut impl EventSink,
    ) {
        let from = self.machine.mode();
        self.machine.set_transit_signal(signal);
        if !self.machine.has_status_updated() {
            return;
        }

        let to = self.machine.mode();
        panel.set_mode_indicator(to.indicator());
        sink.emit(&AppEvent::ModeChanged { from, to });

        let command = self.machine.meas_command();
        self.engine.set_mode(to);
        match self.engine.set_command(command, hw) {
            Ok(()) => {
                if command == MeasCommand::Start {
                    panel.set_sensor_error(self.engine.is_sensor_error());
                    if !self.engine.is_ready() {
                        sink.emit(&AppEvent::MeasurementStarted(to));
                    }
                }
            }
            Err(e) => {
                warn!("Instrument: {:?} refused: {}", command, e);
                sink.emit(&AppEvent::CommandRejected("measurement command refused"));
            }
        }

        // A START that could not energize fails within this tick.
        self.collect_engine_signals(signals, panel, sink);
    }

    fn refresh_led(&mut self, panel: &mut impl PanelPort) {
        let pattern = if !self.engine.is_ready() {
            LedPattern::Solid
        } else if self.engine.is_sensor_error() {
            LedPattern::Blink
        } else {
            LedPattern::Off
        };
        self.led.set_pattern(pattern);
        panel.set_led(self.led.clk_in());
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        panel: &mut impl PanelPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetTimerPeriod(minutes) => {
                if let Err(e) = self.timer.init(minutes) {
                    sink.emit(&AppEvent::CommandRejected("timer period out of range"));
                    return Err(e);
                }
                panel.set_timer_remaining(self.timer.remaining_time());
                Ok(())
            }
            AppCommand::Inject(signal) => {
                if self.injected.push_back(signal).is_err() {
                    warn!("Instrument: signal queue full, {:?} dropped", signal);
                    sink.emit(&AppEvent::CommandRejected("signal queue full"));
                    return Err(CommandError::Busy.into());
                }
                Ok(())
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            serial_number: self.params.serial_number.clone(),
            mode: self.machine.mode(),
            level: self.engine.result(),
            sensor_error: self.engine.is_sensor_error(),
            timer_remaining: self.timer.is_active().then(|| self.timer.remaining_time()),
            busy: !self.engine.is_ready(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    /// Latest level [0.1 %].
    pub fn level(&self) -> u16 {
        self.engine.result()
    }

    pub fn is_sensor_error(&self) -> bool {
        self.engine.is_sensor_error()
    }

    pub fn is_measuring(&self) -> bool {
        !self.engine.is_ready()
    }

    pub fn is_current_on(&self) -> bool {
        self.engine.is_current_on()
    }

    pub fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// Total ticks executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn enqueue<const N: usize>(signals: &mut SignalQueue<N>, signal: TransitionSignal) {
    if signals.push_back(signal).is_err() {
        warn!("Instrument: signal queue full, {:?} dropped", signal);
    }
}
