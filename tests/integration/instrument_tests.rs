//! Integration tests for the switch → mode machine → measurement pipeline.
//!
//! These run on the host and drive the full tick orchestration against
//! the simulated front end, checking mode changes, hardware side effects
//! and the emitted event stream together.

use levelmeter::app::commands::AppCommand;
use levelmeter::app::events::AppEvent;
use levelmeter::app::ports::DacChannel;
use levelmeter::config::ParameterRecord;
use levelmeter::fsm::{Mode, TransitionSignal};
use levelmeter::measurement::monitor::MONITOR_FAILURE_CODE;

use super::rig::Rig;

fn params() -> ParameterRecord {
    ParameterRecord {
        timer_period_min: 10,
        ..ParameterRecord::default()
    }
}

fn finished(e: &AppEvent) -> bool {
    matches!(e, AppEvent::MeasurementFinished { .. })
}

fn fault(e: &AppEvent) -> bool {
    matches!(e, AppEvent::SensorFault)
}

fn measured(e: &AppEvent) -> bool {
    matches!(e, AppEvent::LevelMeasured { .. })
}

// ── Manual single shot ────────────────────────────────────────

#[test]
fn click_runs_exactly_one_manual_measurement() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.run(5);

    rig.click();
    assert_eq!(rig.app.mode(), Mode::Manual);
    assert_eq!(rig.panel.mode_indicator, 'M');
    assert!(rig.app.is_measuring());
    assert!(rig.hw.source_enabled(), "sensor must be energized");

    rig.run_until(2_000, |app| app.mode() == Mode::Timer);

    assert_eq!(rig.sink.count(finished), 1);
    assert_eq!(rig.sink.count(fault), 0);
    assert!(!rig.app.is_measuring());
    assert!(!rig.hw.source_enabled(), "sensor must be de-energized");
    assert_eq!(rig.panel.mode_indicator, 'T');
    assert!(!rig.panel.sensor_error);

    let level = rig.app.level();
    assert!((485..=515).contains(&level), "level {level} should be near 50 %");
    assert_eq!(rig.panel.level, level);
}

#[test]
fn manual_measurement_vacates_bus_once_per_sample() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.click();
    rig.run_until(2_000, |app| app.mode() == Mode::Timer);

    let samples = rig.sink.count(measured) as u32;
    assert!(samples >= 2, "expected progress samples plus the final one");
    assert_eq!(rig.panel.vacate_count, samples);
    assert!(!rig.panel.vacate_bus);
}

#[test]
fn click_while_measuring_is_ignored() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.click();
    rig.run(20);
    rig.click();
    assert_eq!(rig.app.mode(), Mode::Manual);

    rig.run_until(2_000, |app| app.mode() == Mode::Timer);
    assert_eq!(rig.sink.count(finished), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::MeasurementStarted(_))),
        1
    );
}

// ── Continuous ────────────────────────────────────────────────

#[test]
fn long_press_enters_continuous_and_click_stops() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.long_press();
    assert_eq!(rig.app.mode(), Mode::Continuous);
    assert_eq!(rig.panel.mode_indicator, 'C');
    assert!(rig.app.is_current_on());

    rig.run(350);
    assert!(rig.sink.count(measured) >= 3);
    assert!(rig.app.is_measuring());

    rig.click();
    assert_eq!(rig.app.mode(), Mode::Timer);
    assert!(!rig.app.is_current_on());
    assert!(!rig.hw.source_enabled());
    assert_eq!(rig.sink.count(finished), 0);
    assert_eq!(rig.sink.count(fault), 0);
}

#[test]
fn sensor_fault_in_continuous_returns_to_timer() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.long_press();
    rig.run(150);
    rig.hw.inject_sensor_fault(true);

    rig.run_until(200, |app| app.mode() == Mode::Timer);

    assert_eq!(rig.sink.count(fault), 1);
    assert!(rig.app.is_sensor_error());
    assert!(rig.panel.sensor_error);
    assert!(!rig.hw.source_enabled());
    assert_eq!(rig.hw.last_dac(DacChannel::Monitor), Some(MONITOR_FAILURE_CODE));
}

#[test]
fn fault_on_start_fails_within_the_same_tick() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.hw.inject_sensor_fault(true);

    rig.click();

    assert_eq!(rig.app.mode(), Mode::Timer);
    assert_eq!(rig.sink.count(fault), 1);
    assert!(!rig.app.is_measuring());
    assert!(!rig.hw.source_enabled());
}

#[test]
fn new_session_clears_previous_sensor_error() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.hw.inject_sensor_fault(true);
    rig.click();
    assert!(rig.app.is_sensor_error());

    rig.hw.inject_sensor_fault(false);
    rig.click();
    assert!(!rig.app.is_sensor_error());
    rig.run_until(2_000, |app| app.mode() == Mode::Timer);
    assert!(!rig.panel.sensor_error);
    assert_eq!(rig.sink.count(finished), 1);
}

// ── Interval timer ────────────────────────────────────────────

#[test]
fn timer_counts_down_and_triggers_manual_measurement() {
    let p = params();
    let mut rig = Rig::start(&p);
    assert_eq!(rig.panel.timer_remaining, 10);

    rig.run(6_000);
    assert_eq!(rig.panel.timer_remaining, 9);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TimerMinuteElapsed { remaining: 9 })),
        1
    );

    rig.run(54_000);
    assert_eq!(rig.app.mode(), Mode::Manual);
    assert_eq!(rig.panel.timer_remaining, 10);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::MeasurementStarted(Mode::Manual)),
        1
    );

    rig.run_until(2_000, |app| app.mode() == Mode::Timer);
    assert_eq!(rig.sink.count(finished), 1);
}

#[test]
fn out_of_range_timer_period_is_rejected() {
    let p = params();
    let mut rig = Rig::start(&p);

    let result = rig
        .app
        .handle_command(AppCommand::SetTimerPeriod(91), &mut rig.panel, &mut rig.sink);
    assert!(result.is_err());
    assert_eq!(rig.app.timer().period(), 10);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CommandRejected(_))),
        1
    );

    rig.app
        .handle_command(AppCommand::SetTimerPeriod(35), &mut rig.panel, &mut rig.sink)
        .unwrap();
    assert_eq!(rig.app.timer().period(), 30);
    assert_eq!(rig.panel.timer_remaining, 30);
}

#[test]
fn zero_period_disables_timer() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.app
        .handle_command(AppCommand::SetTimerPeriod(0), &mut rig.panel, &mut rig.sink)
        .unwrap();

    rig.run(60_000);
    assert_eq!(rig.app.mode(), Mode::Timer);
    assert_eq!(rig.app.build_telemetry().timer_remaining, None);
}

// ── Injected signals ──────────────────────────────────────────

#[test]
fn injected_click_behaves_like_switch() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.app
        .handle_command(
            AppCommand::Inject(TransitionSignal::Click),
            &mut rig.panel,
            &mut rig.sink,
        )
        .unwrap();
    assert_eq!(rig.app.mode(), Mode::Timer, "delivered on the next tick");

    rig.run(1);
    assert_eq!(rig.app.mode(), Mode::Manual);
    assert!(rig.sink.events.contains(&AppEvent::ModeChanged {
        from: Mode::Timer,
        to: Mode::Manual,
    }));
}

#[test]
fn injected_measurement_complete_is_ignored_in_timer() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.sink.clear();
    rig.app
        .handle_command(
            AppCommand::Inject(TransitionSignal::MeasurementComplete),
            &mut rig.panel,
            &mut rig.sink,
        )
        .unwrap();
    rig.run(1);
    assert_eq!(rig.app.mode(), Mode::Timer);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ModeChanged { .. })),
        0
    );
}

// ── Status LED ────────────────────────────────────────────────

#[test]
fn led_is_solid_while_measuring_and_blinks_on_error() {
    let p = params();
    let mut rig = Rig::start(&p);
    rig.run(5);
    assert!(!rig.panel.led);

    rig.long_press();
    rig.run(2);
    assert!(rig.panel.led, "solid while acquiring");

    rig.hw.inject_sensor_fault(true);
    rig.run_until(200, |app| app.mode() == Mode::Timer);

    let before = rig.panel.led_changes;
    rig.run(400);
    assert!(
        rig.panel.led_changes >= before + 6,
        "LED should blink after a sensor error"
    );
}
