//! Integration tests for the acquisition loop
//!
//! Drives full cycles against scripted sensors, a recording indicator and a
//! recording (or failing) telemetry sink.

mod common;

use rotbot_core::time::MockClock;
use rotbot_core::{
    AcquisitionLoop, ClassifierConfig, IndicatorTiming, LoopConfig, SensorErrorKind,
    SensorFaultPolicy, StateClassifier, SystemState, TelemetryOutcome,
};

use common::{
    RecordingIndicator, RecordingSink, ScriptedCycle, ScriptedSensors, GREEN_READING,
    RED_READING, UNLISTED_READING,
};

fn classifier() -> StateClassifier {
    StateClassifier::new(ClassifierConfig::reference()).expect("reference config is valid")
}

#[test]
fn indicator_lags_classification_by_one_cycle() {
    let mut sensors = ScriptedSensors::new([
        ScriptedCycle::from_reading(RED_READING),
        ScriptedCycle::from_reading(RED_READING),
        ScriptedCycle::from_reading(GREEN_READING),
    ]);
    let mut indicator = RecordingIndicator::default();
    let mut sink = RecordingSink::default();

    let mut node = AcquisitionLoop::new(
        &mut sensors,
        &mut indicator,
        &mut sink,
        MockClock::new(0),
        classifier(),
        LoopConfig::default(),
    );

    let first = node.step();
    assert_eq!(first.indicated, SystemState::Green);
    assert_eq!(first.state, SystemState::Red);

    let second = node.step();
    assert_eq!(second.indicated, SystemState::Red);

    let third = node.step();
    assert_eq!(third.indicated, SystemState::Red);
    assert_eq!(third.state, SystemState::Green);
    drop(node);

    assert_eq!(indicator.shown, vec![SystemState::Green, SystemState::Red, SystemState::Red]);
    // The report always carries the freshly classified state
    let states: Vec<_> = sink.reports.iter().map(|r| r.state).collect();
    assert_eq!(states, vec![SystemState::Red, SystemState::Red, SystemState::Green]);
}

#[test]
fn immediate_timing_removes_the_lag() {
    let mut sensors = ScriptedSensors::new([ScriptedCycle::from_reading(RED_READING)]);
    let mut indicator = RecordingIndicator::default();
    let config = LoopConfig {
        indicator_timing: IndicatorTiming::Immediate,
        ..LoopConfig::default()
    };

    let mut node = AcquisitionLoop::new(
        &mut sensors,
        &mut indicator,
        RecordingSink::default(),
        MockClock::new(0),
        classifier(),
        config,
    );

    let outcome = node.step();
    assert_eq!(outcome.indicated, SystemState::Red);
    drop(node);

    assert_eq!(indicator.shown, vec![SystemState::Red]);
}

#[test]
fn telemetry_failure_leaves_state_alone() {
    let mut sensors = ScriptedSensors::new([
        ScriptedCycle::from_reading(RED_READING),
        ScriptedCycle::from_reading(GREEN_READING),
    ]);
    let mut sink = RecordingSink::failing();

    let mut node = AcquisitionLoop::new(
        &mut sensors,
        RecordingIndicator::default(),
        &mut sink,
        MockClock::new(0),
        classifier(),
        LoopConfig::default(),
    );

    let first = node.step();
    assert_eq!(first.telemetry, TelemetryOutcome::Failed);
    assert_eq!(first.state, SystemState::Red);
    assert_eq!(node.current_state(), SystemState::Red);

    // Next cycle runs normally and reclassifies from scratch
    let second = node.step();
    assert_eq!(second.telemetry, TelemetryOutcome::Failed);
    assert_eq!(second.state, SystemState::Green);
    assert_eq!(second.indicated, SystemState::Red);
    drop(node);

    // One attempt per cycle, no retries
    assert_eq!(sink.attempts, 2);
}

#[test]
fn unlisted_reading_resolves_to_default() {
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new([ScriptedCycle::from_reading(UNLISTED_READING)]),
        RecordingIndicator::default(),
        RecordingSink::default(),
        MockClock::new(0),
        classifier(),
        LoopConfig::default(),
    );

    let outcome = node.step();
    let classification = outcome.classification.expect("classified");
    assert!(!classification.matched);
    assert_eq!(outcome.state, SystemState::Yellow);
    assert_eq!(node.sink().reports[0].reading, UNLISTED_READING);
}

#[test]
fn sensor_fault_passes_driver_value_through() {
    // Humidity read fails but leaves a saturated value behind
    let faulty = ScriptedCycle::ok(29.5, 0.0, 0.0).humidity_fault(SensorErrorKind::Checksum, 56.0);
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new([faulty]),
        RecordingIndicator::default(),
        RecordingSink::default(),
        MockClock::new(0),
        classifier(),
        LoopConfig::default(),
    );

    let outcome = node.step();
    assert_eq!(outcome.sensor_faults, 1);
    assert_eq!(outcome.reading.humidity, 56.0);
    assert_eq!(outcome.state, SystemState::Red);
}

#[test]
fn hold_state_policy_skips_classification_on_fault() {
    let faulty = ScriptedCycle::ok(29.5, 0.0, 0.0).humidity_fault(SensorErrorKind::Timeout, 56.0);
    let config = LoopConfig {
        sensor_fault_policy: SensorFaultPolicy::HoldState,
        ..LoopConfig::default()
    };
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new([ScriptedCycle::from_reading(GREEN_READING), faulty]),
        RecordingIndicator::default(),
        RecordingSink::default(),
        MockClock::new(0),
        classifier(),
        config,
    );

    assert_eq!(node.step().state, SystemState::Green);

    let held = node.step();
    assert!(held.classification.is_none());
    assert_eq!(held.state, SystemState::Green);
    // Telemetry still goes out with the held state
    assert_eq!(held.telemetry, TelemetryOutcome::Delivered);
    assert_eq!(node.sink().reports[1].state, SystemState::Green);
}

#[test]
fn run_cycles_sleeps_after_every_cycle() {
    let mut clock = MockClock::new(0);
    let config = LoopConfig {
        cycle_delay_ms: 5000,
        ..LoopConfig::default()
    };
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new([ScriptedCycle::from_reading(GREEN_READING)]),
        RecordingIndicator::default(),
        RecordingSink::default(),
        &mut clock,
        classifier(),
        config,
    );

    let last = node.run_cycles(3).expect("ran");
    assert_eq!(last.cycle, 3);
    assert_eq!(node.cycles(), 3);
    drop(node);

    assert_eq!(clock.sleeps(), 3);
    assert_eq!(clock.slept_ms(), 15_000);
}

#[test]
fn initial_state_is_configurable() {
    let config = LoopConfig {
        initial_state: SystemState::Yellow,
        ..LoopConfig::default()
    };
    let mut indicator = RecordingIndicator::default();
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new([ScriptedCycle::from_reading(GREEN_READING)]),
        &mut indicator,
        RecordingSink::default(),
        MockClock::new(0),
        classifier(),
        config,
    );

    assert_eq!(node.current_state(), SystemState::Yellow);
    node.step();
    drop(node);
    assert_eq!(indicator.active(), Some(SystemState::Yellow));
}
