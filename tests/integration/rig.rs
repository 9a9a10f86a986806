//! Shared bench for the instrument integration tests.

use levelmeter::adapters::sim::{RecordingSink, SimFrontEnd, SimPanel};
use levelmeter::app::service::Instrument;
use levelmeter::config::{InstrumentConfig, ParameterRecord};

/// Switch hold that clears the default 2 s long-press threshold.
pub const LONG_PRESS_TICKS: u32 = 205;
/// Switch hold well inside the click window.
pub const CLICK_TICKS: u32 = 3;

pub struct Rig<'p> {
    pub app: Instrument<'p>,
    pub hw: SimFrontEnd,
    pub panel: SimPanel,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl<'p> Rig<'p> {
    /// Started instrument with the sensor sitting at half level.
    pub fn start(params: &'p ParameterRecord) -> Self {
        let mut hw = SimFrontEnd::new();
        hw.set_level(0.5, params.sensor_length_inch);
        let mut rig = Self {
            app: Instrument::new(params, InstrumentConfig::default()),
            hw,
            panel: SimPanel::new(),
            sink: RecordingSink::new(),
        };
        rig.app
            .start(&mut rig.hw, &mut rig.panel, &mut rig.sink)
            .expect("instrument start");
        rig
    }

    pub fn run(&mut self, ticks: u32) {
        self.run_with_switch(ticks, false);
    }

    pub fn run_with_switch(&mut self, ticks: u32, level: bool) {
        for _ in 0..ticks {
            self.app.tick(level, &mut self.hw, &mut self.panel, &mut self.sink);
        }
    }

    /// Hold the switch for `ticks`, then release for one tick.
    pub fn press(&mut self, ticks: u32) {
        self.run_with_switch(ticks, true);
        self.run(1);
    }

    pub fn click(&mut self) {
        self.press(CLICK_TICKS);
    }

    pub fn long_press(&mut self) {
        self.press(LONG_PRESS_TICKS);
    }

    /// Tick until `done` holds; returns the ticks taken.
    pub fn run_until(&mut self, limit: u32, done: impl Fn(&Instrument<'_>) -> bool) -> u32 {
        for n in 0..limit {
            if done(&self.app) {
                return n;
            }
            self.run(1);
        }
        panic!("condition not reached within {limit} ticks");
    }
}
