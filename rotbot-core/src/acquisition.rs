//! Acquisition loop
//!
//! The top-level sequential driver. One cycle:
//!
//! ```text
//! drive indicator (previous state) → read sensors → quantize → classify
//!     → update current state → report telemetry → sleep
//! ```
//!
//! ## Indicator Lag
//!
//! With [`IndicatorTiming::Lagged`] (the deployed behaviour) the indicator is
//! driven at the top of the cycle from the state resolved in the *previous*
//! cycle, so a new classification becomes visible one cycle later. The first
//! cycle shows the initial state. [`IndicatorTiming::Immediate`] drives the
//! indicator right after classification instead.
//!
//! ## Failure Isolation
//!
//! Nothing here is fatal. Sensor faults are logged and, under
//! [`SensorFaultPolicy::PassThrough`], the driver's leftover value is
//! classified unchanged. Telemetry failures are logged and dropped: the sink
//! only ever sees an immutable report, so it cannot touch the current state,
//! and the next cycle is the only retry.

use crate::classifier::{Classification, StateClassifier};
use crate::config::{IndicatorTiming, LoopConfig, SensorFaultPolicy};
use crate::errors::SensorError;
use crate::reading::{SensorReading, TelemetryReport};
use crate::state::SystemState;
use crate::time::Delay;
use crate::traits::{Indicator, SensorSource, TelemetrySink};

/// What happened to a cycle's telemetry report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryOutcome {
    /// The sink accepted the report
    Delivered,
    /// The sink failed; the error was logged
    Failed,
}

/// Record of one completed cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    /// Cycle number, starting at 1
    pub cycle: u64,
    /// State the indicator showed during this cycle
    pub indicated: SystemState,
    /// Reading used for classification
    pub reading: SensorReading,
    /// Number of sensor reads that failed
    pub sensor_faults: u8,
    /// Classification result, `None` when the cycle held its state
    pub classification: Option<Classification>,
    /// Current state after the cycle
    pub state: SystemState,
    /// Telemetry result
    pub telemetry: TelemetryOutcome,
}

/// Sequential read → classify → actuate → report driver
pub struct AcquisitionLoop<S, I, T, D> {
    sensors: S,
    indicator: I,
    sink: T,
    delay: D,
    classifier: StateClassifier,
    config: LoopConfig,
    state: SystemState,
    cycles: u64,
}

impl<S, I, T, D> AcquisitionLoop<S, I, T, D>
where
    S: SensorSource,
    I: Indicator,
    T: TelemetrySink,
    D: Delay,
{
    /// Assemble a loop; the current state starts at `config.initial_state`
    pub fn new(
        sensors: S,
        indicator: I,
        sink: T,
        delay: D,
        classifier: StateClassifier,
        config: LoopConfig,
    ) -> Self {
        Self {
            sensors,
            indicator,
            sink,
            delay,
            classifier,
            state: config.initial_state,
            config,
            cycles: 0,
        }
    }

    /// State resolved by the most recent classification
    pub fn current_state(&self) -> SystemState {
        self.state
    }

    /// Completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Classifier in use
    pub fn classifier(&self) -> &StateClassifier {
        &self.classifier
    }

    /// Loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Telemetry sink
    pub fn sink(&self) -> &T {
        &self.sink
    }

    /// Run one cycle without the trailing delay
    pub fn step(&mut self) -> CycleOutcome {
        let mut indicated = self.state;
        if self.config.indicator_timing == IndicatorTiming::Lagged {
            self.indicator.set_active(self.state);
        }

        let (reading, sensor_faults) = self.acquire();

        let classification = if sensor_faults > 0
            && self.config.sensor_fault_policy == SensorFaultPolicy::HoldState
        {
            log_warn!("Holding {} after {} failed sensor read(s)", self.state, sensor_faults);
            None
        } else {
            Some(self.classifier.classify_reading(&reading))
        };

        if let Some(result) = classification {
            log_info!(
                "Classified {} as {}{}",
                result.triple,
                result.state,
                if result.matched { "" } else { " (default)" }
            );
            self.state = result.state;
        }

        if self.config.indicator_timing == IndicatorTiming::Immediate {
            self.indicator.set_active(self.state);
            indicated = self.state;
        }

        let report = TelemetryReport::new(reading, self.state);
        let telemetry = match self.sink.submit(&report) {
            Ok(()) => TelemetryOutcome::Delivered,
            Err(err) => {
                log_warn!("Telemetry dropped for this cycle: {}", err);
                TelemetryOutcome::Failed
            }
        };

        self.cycles += 1;
        CycleOutcome {
            cycle: self.cycles,
            indicated,
            reading,
            sensor_faults,
            classification,
            state: self.state,
            telemetry,
        }
    }

    /// Run `count` cycles, each followed by the configured delay
    pub fn run_cycles(&mut self, count: u64) -> Option<CycleOutcome> {
        let mut last = None;
        for _ in 0..count {
            last = Some(self.step());
            self.delay.delay_ms(self.config.cycle_delay_ms);
        }
        last
    }

    /// Run forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
            self.delay.delay_ms(self.config.cycle_delay_ms);
        }
    }

    fn acquire(&mut self) -> (SensorReading, u8) {
        let mut faults = 0;
        let temperature = Self::take(self.sensors.read_temperature(), &mut faults);
        let humidity = Self::take(self.sensors.read_humidity(), &mut faults);
        let light = Self::take(self.sensors.read_light_intensity(), &mut faults);
        (SensorReading::new(temperature, humidity, light), faults)
    }

    fn take(result: Result<f32, SensorError>, faults: &mut u8) -> f32 {
        match result {
            Ok(value) => value,
            Err(err) => {
                *faults += 1;
                log_warn!("Sensor fault: {}", err);
                err.raw
            }
        }
    }
}
