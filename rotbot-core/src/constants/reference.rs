//! Reference Boundaries and Rule Tables
//!
//! Consolidated deployment tables. Deployments override them through
//! [`crate::ClassifierConfig`]; classification code never reads these directly.
//!
//! Bucket layout (each boundary is the inclusive top of its bucket):
//!
//! ```text
//! temperature °C : ≤22 | ≤24 | ≤29 | ≤30 | above
//! humidity %RH   : ≤28 | ≤55 | ≤56 | above
//! light counts   : ≤0  | ≤1300 | ≤2500 | ≤2501 | above
//! ```
//!
//! Combinations listed in none of the tables fall back to the default state.

use crate::quantizer::{Category, QuantizedTriple};
use crate::state::SystemState;

/// Temperature boundaries (°C).
pub const TEMPERATURE_BOUNDARIES: [f32; 4] = [22.0, 24.0, 29.0, 30.0];

/// Relative humidity boundaries (%).
pub const HUMIDITY_BOUNDARIES: [f32; 3] = [28.0, 55.0, 56.0];

/// Light intensity boundaries (raw ADC counts).
pub const LIGHT_BOUNDARIES: [f32; 4] = [0.0, 1300.0, 2500.0, 2501.0];

/// State for combinations no rule lists.
///
/// Unknown conditions are cautionary rather than safe.
pub const DEFAULT_STATE: SystemState = SystemState::Yellow;

const fn t(temperature: f32, humidity: f32, light: f32) -> QuantizedTriple {
    QuantizedTriple::at_most(temperature, humidity, light)
}

const ABOVE: Category = Category::AboveMaximum;

/// Cool, not saturated, dim.
pub const GREEN_RULES: [QuantizedTriple; 7] = [
    t(22.0, 28.0, 0.0),
    t(22.0, 28.0, 1300.0),
    t(22.0, 55.0, 0.0),
    t(22.0, 55.0, 1300.0),
    t(24.0, 28.0, 0.0),
    t(24.0, 28.0, 1300.0),
    t(24.0, 55.0, 0.0),
];

/// Warm or humid or bright, but not all three.
pub const YELLOW_RULES: [QuantizedTriple; 12] = [
    t(22.0, 56.0, 0.0),
    t(22.0, 56.0, 1300.0),
    t(24.0, 56.0, 0.0),
    t(24.0, 56.0, 1300.0),
    t(29.0, 28.0, 0.0),
    t(29.0, 28.0, 1300.0),
    t(29.0, 55.0, 0.0),
    t(29.0, 55.0, 1300.0),
    t(22.0, 28.0, 2500.0),
    t(22.0, 55.0, 2500.0),
    t(24.0, 28.0, 2500.0),
    t(24.0, 55.0, 2500.0),
];

/// Hot and saturated.
pub const RED_RULES: [QuantizedTriple; 11] = [
    t(29.0, 56.0, 0.0),
    t(29.0, 56.0, 1300.0),
    t(29.0, 56.0, 2500.0),
    t(30.0, 55.0, 0.0),
    t(30.0, 56.0, 0.0),
    t(30.0, 56.0, 1300.0),
    t(30.0, 56.0, 2500.0),
    QuantizedTriple::new(Category::AtMost(30.0), ABOVE, Category::AtMost(0.0)),
    QuantizedTriple::new(ABOVE, Category::AtMost(56.0), Category::AtMost(0.0)),
    QuantizedTriple::new(ABOVE, Category::AtMost(56.0), Category::AtMost(1300.0)),
    QuantizedTriple::new(ABOVE, ABOVE, Category::AtMost(0.0)),
];
