//! Environmental classification engine for RotBot
//!
//! Samples temperature, humidity and light, snaps each reading onto a small
//! set of configured category boundaries, and resolves the combination to one
//! of three alert states that drive a tri-colour indicator and a telemetry
//! report.
//!
//! Key constraints:
//! - Runs on a single microcontroller loop (no threads, no executor)
//! - No heap allocation: tables are bounded `heapless` collections
//! - Classification is a pure function of the tables and the reading
//!
//! ```
//! use rotbot_core::{ClassifierConfig, SensorReading, StateClassifier, SystemState};
//!
//! let classifier = StateClassifier::new(ClassifierConfig::reference())?;
//!
//! // Cool, dry and dark: nothing is going off
//! let reading = SensorReading::new(21.0, 40.0, 0.0);
//! assert_eq!(classifier.classify_reading(&reading).state, SystemState::Green);
//! # Ok::<(), rotbot_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod acquisition;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod errors;
pub mod quantizer;
pub mod reading;
pub mod state;
pub mod time;
pub mod traits;

// Public API
pub use acquisition::{AcquisitionLoop, CycleOutcome, TelemetryOutcome};
pub use classifier::{Classification, RuleTable, StateClassifier};
pub use config::{ClassifierConfig, IndicatorTiming, LoopConfig, SensorFaultPolicy};
pub use errors::{ConfigError, ConfigResult, SensorError, SensorErrorKind};
pub use quantizer::{Category, CategoryBoundaries, QuantizedTriple, Quantizer};
pub use reading::{Dimension, SensorReading, TelemetryReport};
pub use state::SystemState;
pub use traits::{Indicator, SensorSource, TelemetrySink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
