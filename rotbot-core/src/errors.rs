//! Error types for configuration and sensor acquisition
//!
//! ## Design Philosophy
//!
//! Errors stay small and `Copy` so they can be returned from the acquisition
//! loop without allocation. Only two things can go wrong in the core:
//!
//! - **Configuration**: boundary lists or rule tables that cannot be matched
//!   the way the classifier expects. These are caught once, at startup.
//! - **Sensor reads**: transient driver failures. These are logged and the
//!   cycle carries on; nothing here is fatal.
//!
//! Classification never fails. A triple that matches no rule resolves to the
//! configured default state, which is a policy decision, not an error.
//!
//! ## Stale Values
//!
//! Sensor drivers commonly hand back whatever sits in their output buffer when
//! a read fails. [`SensorError::raw`] carries that value so the loop can decide
//! what to do with it (see [`crate::SensorFaultPolicy`]).

use thiserror_no_std::Error;

use crate::reading::Dimension;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors - raised while building boundaries and rule tables
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A dimension has no boundaries at all
    #[error("No boundaries configured for {dimension}")]
    EmptyBoundaries {
        /// Dimension with the empty list
        dimension: Dimension,
    },

    /// A boundary is NaN or infinite
    #[error("Boundary {index} for {dimension} is not a finite number")]
    NonFiniteBoundary {
        /// Dimension the boundary belongs to
        dimension: Dimension,
        /// Position in the boundary list
        index: usize,
    },

    /// Boundaries must be strictly increasing
    #[error("Boundaries for {dimension} not increasing: {previous} then {next}")]
    UnorderedBoundaries {
        /// Dimension the list belongs to
        dimension: Dimension,
        /// Earlier boundary
        previous: f32,
        /// Offending later boundary
        next: f32,
    },

    /// A bounded table ran out of room
    #[error("Capacity exceeded for {what}: limit is {limit}")]
    CapacityExceeded {
        /// Which table overflowed
        what: &'static str,
        /// Maximum number of entries
        limit: usize,
    },

    /// A rule names a category that is not one of the dimension's buckets
    #[error("Rule category {value} is not a {dimension} boundary")]
    UnknownCategory {
        /// Dimension of the offending category
        dimension: Dimension,
        /// Category value as written in the rule
        value: f32,
    },
}

/// What went wrong during a sensor read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorErrorKind {
    /// Data frame checksum mismatch
    Checksum,
    /// Sensor did not answer in time
    Timeout,
    /// Sensor not present on the bus
    Connect,
    /// Sensor returned the previous sample again
    Stale,
    /// All data bytes were zero
    AllZero,
    /// Anything the driver could not classify
    Other,
}

impl SensorErrorKind {
    /// Short lowercase name used in log lines
    pub const fn name(&self) -> &'static str {
        match self {
            SensorErrorKind::Checksum => "checksum",
            SensorErrorKind::Timeout => "timeout",
            SensorErrorKind::Connect => "connect",
            SensorErrorKind::Stale => "stale",
            SensorErrorKind::AllZero => "all-zero",
            SensorErrorKind::Other => "other",
        }
    }
}

impl core::fmt::Display for SensorErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Failed sensor read, with the value the driver left behind
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{dimension} read failed ({kind}), driver left {raw}")]
pub struct SensorError {
    /// Which sensor failed
    pub dimension: Dimension,
    /// Failure category reported by the driver
    pub kind: SensorErrorKind,
    /// Value the driver returned anyway (stale or garbage)
    pub raw: f32,
}

impl SensorError {
    /// Create a sensor error
    pub const fn new(dimension: Dimension, kind: SensorErrorKind, raw: f32) -> Self {
        Self { dimension, kind, raw }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::EmptyBoundaries { dimension } =>
                defmt::write!(fmt, "No boundaries for {}", dimension.name()),
            Self::NonFiniteBoundary { dimension, index } =>
                defmt::write!(fmt, "Boundary {} of {} not finite", index, dimension.name()),
            Self::UnorderedBoundaries { dimension, previous, next } =>
                defmt::write!(fmt, "{} boundaries not increasing: {} then {}", dimension.name(), previous, next),
            Self::CapacityExceeded { what, limit } =>
                defmt::write!(fmt, "{} over capacity {}", what, limit),
            Self::UnknownCategory { dimension, value } =>
                defmt::write!(fmt, "{} is not a {} boundary", value, dimension.name()),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} read failed ({}), raw {}",
            self.dimension.name(),
            self.kind.name(),
            self.raw
        )
    }
}
