//! Collaborator traits
//!
//! The core owns no hardware. Boards plug in through these three seams:
//! - [`SensorSource`]: temperature, humidity and light reads
//! - [`Indicator`]: the three mutually exclusive outputs
//! - [`TelemetrySink`]: delivery of the per-cycle report
//!
//! Keep implementations simple. The loop calls each method once per cycle,
//! never retries, and never runs two calls concurrently.

use core::fmt;

use crate::errors::SensorError;
use crate::reading::TelemetryReport;
use crate::state::SystemState;

/// Raw sensor access
///
/// A failed read returns [`SensorError`] carrying whatever value the driver
/// produced anyway; the loop's fault policy decides whether it is used.
pub trait SensorSource {
    /// Air temperature in °C
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity in %
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// Light intensity in raw units
    fn read_light_intensity(&mut self) -> Result<f32, SensorError>;
}

/// Tri-colour indicator
pub trait Indicator {
    /// Activate the output for `state` and deactivate the other two
    fn set_active(&mut self, state: SystemState);
}

/// Destination for the per-cycle telemetry report
///
/// Implementations must release any connection before returning, on success
/// and on failure alike. Errors are logged by the loop and go no further.
pub trait TelemetrySink {
    /// Failure description, logged and discarded
    type Error: fmt::Display;

    /// Deliver one report
    fn submit(&mut self, report: &TelemetryReport) -> Result<(), Self::Error>;
}

impl<S: SensorSource + ?Sized> SensorSource for &mut S {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        (**self).read_temperature()
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        (**self).read_humidity()
    }

    fn read_light_intensity(&mut self) -> Result<f32, SensorError> {
        (**self).read_light_intensity()
    }
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn set_active(&mut self, state: SystemState) {
        (**self).set_active(state)
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    type Error = T::Error;

    fn submit(&mut self, report: &TelemetryReport) -> Result<(), Self::Error> {
        (**self).submit(report)
    }
}
