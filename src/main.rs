//! Level meter bench simulator.  Drives the control core from a simulated clock.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                    │
//! │                                                           │
//! │  SimFrontEnd          SimPanel        LogEventSink        │
//! │  (ADC·DAC·GPIO·Delay) (PanelPort)     (EventSink)         │
//! │  StaticParameters                                         │
//! │  (ParameterPort)                                          │
//! │                                                           │
//! │  ──────────────── Port Trait Boundary ──────────────      │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │           Instrument (pure logic)                   │  │
//! │  │  IntervalTimer · ModeMachine · MeasurementEngine    │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `levelmeter-sim [level-percent]` (default 42.0).  Log output
//! goes to stderr; `RUST_LOG=debug` adds per-sample detail.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use levelmeter::adapters::log_sink::LogEventSink;
use levelmeter::adapters::sim::{SimFrontEnd, SimPanel, StaticParameters};
use levelmeter::app::commands::AppCommand;
use levelmeter::app::ports::ParameterPort;
use levelmeter::app::service::Instrument;
use levelmeter::config::{InstrumentConfig, ParameterRecord};
use levelmeter::fsm::{Mode, TransitionSignal};

// ── Bench rig ─────────────────────────────────────────────────

struct Bench<'p> {
    app: Instrument<'p>,
    hw: SimFrontEnd,
    panel: SimPanel,
    sink: LogEventSink,
}

impl Bench<'_> {
    fn run(&mut self, ticks: u32, switch_level: bool) {
        for _ in 0..ticks {
            self.app
                .tick(switch_level, &mut self.hw, &mut self.panel, &mut self.sink);
        }
    }

    fn run_until(&mut self, limit: u32, done: impl Fn(&Instrument<'_>) -> bool) -> Result<()> {
        for _ in 0..limit {
            if done(&self.app) {
                return Ok(());
            }
            self.run(1, false);
        }
        anyhow::bail!("condition not reached within {} ticks", limit)
    }

    fn press(&mut self, hold_ticks: u32) {
        self.run(hold_ticks, true);
        self.run(1, false);
    }

    fn command(&mut self, cmd: AppCommand) -> Result<()> {
        self.app
            .handle_command(cmd, &mut self.panel, &mut self.sink)
            .with_context(|| format!("command {:?}", cmd))
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let level_percent: f32 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid level percentage '{}'", arg))?,
        None => 42.0,
    };

    info!("Level meter bench v{}", env!("CARGO_PKG_VERSION"));

    let store = StaticParameters(ParameterRecord {
        timer_period_min: 10,
        ..ParameterRecord::default()
    });
    let params = store.load().context("loading parameter record")?;
    let config = InstrumentConfig::default();
    let long_press = config.ticks(config.long_press_ms) + 10;

    let mut hw = SimFrontEnd::new();
    hw.set_level(level_percent / 100.0, params.sensor_length_inch);

    let mut bench = Bench {
        app: Instrument::new(&params, config),
        hw,
        panel: SimPanel::new(),
        sink: LogEventSink::new(),
    };
    bench
        .app
        .start(&mut bench.hw, &mut bench.panel, &mut bench.sink)
        .context("starting instrument")?;

    // ── Manual single shot ────────────────────────────────────
    info!("-- click: manual measurement");
    bench.press(5);
    bench.run_until(2_000, |app| app.mode() == Mode::Timer)?;

    // ── Continuous ────────────────────────────────────────────
    info!("-- long press: continuous measurement");
    bench.press(long_press);
    bench.run(500, false);
    info!("-- click: stop");
    bench.press(5);
    bench.run_until(10, |app| app.mode() == Mode::Timer)?;

    // ── Sensor fault during continuous ────────────────────────
    info!("-- continuous with sensor fault");
    bench.command(AppCommand::Inject(TransitionSignal::LongPress))?;
    bench.run(250, false);
    bench.hw.inject_sensor_fault(true);
    bench.run_until(200, |app| app.mode() == Mode::Timer)?;
    bench.hw.inject_sensor_fault(false);

    // ── Timer-triggered measurement ───────────────────────────
    info!("-- waiting for the interval timer");
    bench.run_until(20 * 6_000, |app| app.is_measuring())?;
    bench.run_until(2_000, |app| !app.is_measuring())?;

    info!("-- telemetry: {:?}", bench.app.build_telemetry());
    info!(
        "-- panel: mode={} level={} error={} remaining={} min",
        bench.panel.mode_indicator, bench.panel.level, bench.panel.sensor_error, bench.panel.timer_remaining
    );
    Ok(())
}
