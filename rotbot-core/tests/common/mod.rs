//! Shared test doubles for the acquisition loop
//!
//! - `ScriptedSensors`: replays a fixed list of per-cycle read results
//! - `RecordingIndicator`: remembers every state it was asked to show
//! - `RecordingSink`: stores reports, optionally failing every submission

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;

use rotbot_core::{
    Dimension, Indicator, SensorError, SensorErrorKind, SensorReading, SensorSource,
    SystemState, TelemetryReport, TelemetrySink,
};

/// One cycle's worth of sensor results
#[derive(Debug, Clone, Copy)]
pub struct ScriptedCycle {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub light: Result<f32, SensorError>,
}

impl ScriptedCycle {
    pub fn ok(temperature: f32, humidity: f32, light: f32) -> Self {
        Self {
            temperature: Ok(temperature),
            humidity: Ok(humidity),
            light: Ok(light),
        }
    }

    pub fn from_reading(reading: SensorReading) -> Self {
        Self::ok(reading.temperature, reading.humidity, reading.light)
    }

    /// Humidity read fails with `kind`, leaving `raw` behind
    pub fn humidity_fault(mut self, kind: SensorErrorKind, raw: f32) -> Self {
        self.humidity = Err(SensorError::new(Dimension::Humidity, kind, raw));
        self
    }
}

/// Sensors replaying a script; repeats the last cycle once exhausted
pub struct ScriptedSensors {
    script: VecDeque<ScriptedCycle>,
    current: Option<ScriptedCycle>,
    reads: usize,
}

impl ScriptedSensors {
    pub fn new(script: impl IntoIterator<Item = ScriptedCycle>) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: None,
            reads: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    fn cycle(&mut self) -> ScriptedCycle {
        self.reads += 1;
        // Temperature is read first each cycle
        if self.reads % 3 == 1 {
            if let Some(next) = self.script.pop_front() {
                self.current = Some(next);
            }
        }
        self.current.unwrap_or(ScriptedCycle::ok(0.0, 0.0, 0.0))
    }
}

impl SensorSource for ScriptedSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.cycle().temperature
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.cycle().humidity
    }

    fn read_light_intensity(&mut self) -> Result<f32, SensorError> {
        self.cycle().light
    }
}

/// Indicator that records every activation
#[derive(Default)]
pub struct RecordingIndicator {
    pub shown: Vec<SystemState>,
}

impl RecordingIndicator {
    pub fn active(&self) -> Option<SystemState> {
        self.shown.last().copied()
    }
}

impl Indicator for RecordingIndicator {
    fn set_active(&mut self, state: SystemState) {
        self.shown.push(state);
    }
}

#[derive(Debug)]
pub struct SinkDown;

impl fmt::Display for SinkDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection refused")
    }
}

/// Sink that stores reports and can be switched to failing
#[derive(Default)]
pub struct RecordingSink {
    pub reports: Vec<TelemetryReport>,
    pub failing: bool,
    pub attempts: usize,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

impl TelemetrySink for RecordingSink {
    type Error = SinkDown;

    fn submit(&mut self, report: &TelemetryReport) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.failing {
            return Err(SinkDown);
        }
        self.reports.push(*report);
        Ok(())
    }
}

/// A reading the reference tables classify Red (hot, saturated, dark)
pub const RED_READING: SensorReading = SensorReading::new(29.5, 56.0, 0.0);

/// A reading the reference tables classify Green (cool, dry, dark)
pub const GREEN_READING: SensorReading = SensorReading::new(21.0, 40.0, 0.0);

/// A reading in no reference rule-set
pub const UNLISTED_READING: SensorReading = SensorReading::new(23.5, 54.0, 1299.0);
