//! Classification and loop configuration
//!
//! All policy lives here: boundary lists, rule tables, the fallback state and
//! the loop's timing choices. Changing thresholds never touches classification
//! code. With the `serde` feature every struct loads from any serde format;
//! missing fields fall back to the reference values.

use heapless::Vec;

use crate::classifier::StateClassifier;
use crate::constants::reference;
use crate::constants::{DEFAULT_CYCLE_DELAY_MS, MAX_BOUNDARIES, MAX_RULES_PER_STATE};
use crate::errors::ConfigResult;
use crate::quantizer::QuantizedTriple;
use crate::state::SystemState;

/// Boundaries, rule-sets and fallback state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassifierConfig {
    /// Temperature boundaries (°C), strictly increasing
    pub temperature: Vec<f32, MAX_BOUNDARIES>,
    /// Humidity boundaries (%RH), strictly increasing
    pub humidity: Vec<f32, MAX_BOUNDARIES>,
    /// Light boundaries (raw units), strictly increasing
    pub light: Vec<f32, MAX_BOUNDARIES>,
    /// Triples that resolve Green (checked first)
    pub green: Vec<QuantizedTriple, MAX_RULES_PER_STATE>,
    /// Triples that resolve Yellow (checked second)
    pub yellow: Vec<QuantizedTriple, MAX_RULES_PER_STATE>,
    /// Triples that resolve Red (checked last)
    pub red: Vec<QuantizedTriple, MAX_RULES_PER_STATE>,
    /// State for triples no rule lists
    pub default_state: SystemState,
}

impl ClassifierConfig {
    /// Consolidated reference tables
    pub fn reference() -> Self {
        Self {
            temperature: reference::TEMPERATURE_BOUNDARIES.iter().copied().collect(),
            humidity: reference::HUMIDITY_BOUNDARIES.iter().copied().collect(),
            light: reference::LIGHT_BOUNDARIES.iter().copied().collect(),
            green: reference::GREEN_RULES.iter().copied().collect(),
            yellow: reference::YELLOW_RULES.iter().copied().collect(),
            red: reference::RED_RULES.iter().copied().collect(),
            default_state: reference::DEFAULT_STATE,
        }
    }

    /// Override the fallback state
    pub fn with_default_state(mut self, state: SystemState) -> Self {
        self.default_state = state;
        self
    }

    /// Check that a classifier can be built from this configuration
    pub fn validate(&self) -> ConfigResult<()> {
        StateClassifier::new(self.clone()).map(|_| ())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// When the indicator shows a newly classified state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndicatorTiming {
    /// Indicator shows the previous cycle's state, driven before acquisition
    #[default]
    Lagged,
    /// Indicator is driven right after classification (no lag)
    Immediate,
}

/// What a failed sensor read does to the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorFaultPolicy {
    /// Classify with whatever value the driver left behind
    #[default]
    PassThrough,
    /// Keep the current state and skip classification for the cycle
    HoldState,
}

/// Acquisition loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoopConfig {
    /// Delay between cycles in milliseconds
    pub cycle_delay_ms: u32,
    /// Indicator update ordering
    pub indicator_timing: IndicatorTiming,
    /// Handling of failed sensor reads
    pub sensor_fault_policy: SensorFaultPolicy,
    /// State shown before the first classification
    pub initial_state: SystemState,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycle_delay_ms: DEFAULT_CYCLE_DELAY_MS,
            indicator_timing: IndicatorTiming::Lagged,
            sensor_fault_policy: SensorFaultPolicy::PassThrough,
            initial_state: SystemState::Green,
        }
    }
}
