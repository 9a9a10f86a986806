//! Sample cadences for the two acquiring modes.
//!
//! Both are pure tick counters: they never touch hardware and only tell
//! the engine when a sample is due.

use crate::config::InstrumentConfig;

/// Heat propagation velocity along the sensor [inch/s].
pub const HEAT_PROPAGATION_VELOCITY: f32 = 7.9;
/// Margin applied on top of the propagation time.
pub const PROPAGATION_SAFETY: f32 = 1.2;
/// Propagation wait per inch of sensor [ms].
pub const PROPAGATION_MS_PER_INCH: u32 =
    (1000.0 * PROPAGATION_SAFETY / HEAT_PROPAGATION_VELOCITY) as u32;

/// Samples spread over the propagation window before the final one.
const PRE_FINAL_SAMPLES: u32 = 3;

/// Kind of sample a cadence asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRequest {
    /// Progress reading while heat propagates.
    Regular,
    /// The authoritative single-shot reading.
    Final,
}

/// Thermal propagation wait for a sensor [ms].
pub fn propagation_ms(sensor_length_inch: u8) -> u32 {
    u32::from(sensor_length_inch) * PROPAGATION_MS_PER_INCH
}

// ---------------------------------------------------------------------------
// Single shot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SingleShotCadence {
    elapsed: u32,
    interval: u32,
    total_period: u32,
    margin: u32,
    final_requested: bool,
}

impl SingleShotCadence {
    pub fn new(sensor_length_inch: u8, config: &InstrumentConfig) -> Self {
        let total_period = propagation_ms(sensor_length_inch)
            .checked_div(config.tick_period_ms)
            .unwrap_or(0);
        let fallback = config.ticks(config.short_sensor_interval_ms);
        let interval = (total_period / PRE_FINAL_SAMPLES).max(fallback);

        Self {
            elapsed: 0,
            interval,
            total_period,
            margin: config.final_margin_ticks,
            final_requested: false,
        }
    }

    /// Advance one tick.
    pub fn clk_in(&mut self) -> Option<SampleRequest> {
        if self.final_requested {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(1);

        if self.elapsed <= self.total_period {
            return (self.elapsed % self.interval == 0).then_some(SampleRequest::Regular);
        }
        if self.elapsed >= self.total_period + self.margin {
            self.final_requested = true;
            return Some(SampleRequest::Final);
        }
        None
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn total_period(&self) -> u32 {
        self.total_period
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// `true` once the window is over and only the final sample remains.
    pub fn is_final_phase(&self) -> bool {
        self.elapsed > self.total_period
    }
}

// ---------------------------------------------------------------------------
// Continuous
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContinuousCadence {
    counter: u32,
    interval: u32,
}

impl ContinuousCadence {
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            counter: 0,
            interval: interval_ticks.max(1),
        }
    }

    /// Advance one tick; `true` when a sample is due.
    pub fn clk_in(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.interval {
            self.counter = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(cadence: &mut SingleShotCadence, ticks: u32) -> Vec<(u32, SampleRequest)> {
        (1..=ticks)
            .filter_map(|t| cadence.clk_in().map(|r| (t, r)))
            .collect()
    }

    #[test]
    fn propagation_constant() {
        assert_eq!(PROPAGATION_MS_PER_INCH, 151);
        assert_eq!(propagation_ms(20), 3020);
    }

    #[test]
    fn long_sensor_three_samples_then_final() {
        let cfg = InstrumentConfig::default();
        let mut c = SingleShotCadence::new(20, &cfg);
        assert_eq!(c.total_period(), 302);
        assert_eq!(c.interval(), 100);

        let requests = run(&mut c, 1000);
        assert_eq!(
            requests,
            vec![
                (100, SampleRequest::Regular),
                (200, SampleRequest::Regular),
                (300, SampleRequest::Regular),
                (304, SampleRequest::Final),
            ]
        );
    }

    #[test]
    fn window_of_one_and_a_half_seconds_keeps_computed_interval() {
        let cfg = InstrumentConfig::default();
        // 10 inch -> 1510 ms -> 151 ticks -> interval 50.
        let mut c = SingleShotCadence::new(10, &cfg);
        assert_eq!(c.interval(), 50);
        let regular = run(&mut c, 500)
            .iter()
            .filter(|(_, r)| *r == SampleRequest::Regular)
            .count();
        assert_eq!(regular, 3);
    }

    #[test]
    fn short_sensor_uses_fallback_interval() {
        let cfg = InstrumentConfig::default();
        // 5 inch -> 755 ms -> 75 ticks; 75 / 3 = 25 < 50.
        let mut c = SingleShotCadence::new(5, &cfg);
        assert_eq!(c.interval(), 50);
        assert_eq!(
            run(&mut c, 200),
            vec![(50, SampleRequest::Regular), (77, SampleRequest::Final)]
        );
    }

    #[test]
    fn final_fires_once() {
        let cfg = InstrumentConfig::default();
        let mut c = SingleShotCadence::new(1, &cfg);
        let finals = run(&mut c, 10_000)
            .iter()
            .filter(|(_, r)| *r == SampleRequest::Final)
            .count();
        assert_eq!(finals, 1);
        assert!(c.is_final_phase());
    }

    #[test]
    fn continuous_every_interval() {
        let mut c = ContinuousCadence::new(100);
        let due: Vec<u32> = (1..=350).filter(|_| c.clk_in()).collect();
        assert_eq!(due, vec![100, 200, 300]);
    }
}
