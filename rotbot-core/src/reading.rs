//! Sensor readings and telemetry reports
//!
//! A [`SensorReading`] is captured fresh every cycle and never kept past it.
//! A [`TelemetryReport`] pairs it with the state resolved for that cycle and
//! knows how to render itself as the query string the remote endpoint reads.

use core::fmt;

use crate::state::SystemState;

/// Sensed quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dimension {
    /// Air temperature
    Temperature,
    /// Relative humidity
    Humidity,
    /// Ambient light intensity
    Light,
}

impl Dimension {
    /// All dimensions in report order
    pub const ALL: [Dimension; 3] = [Dimension::Temperature, Dimension::Humidity, Dimension::Light];

    /// Lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            Dimension::Temperature => "temperature",
            Dimension::Humidity => "humidity",
            Dimension::Light => "light",
        }
    }

    /// Unit of the raw reading
    pub const fn unit(&self) -> &'static str {
        match self {
            Dimension::Temperature => "°C",
            Dimension::Humidity => "%RH",
            // Raw ADC counts, no calibration applied
            Dimension::Light => "counts",
        }
    }

    /// Field name in the telemetry query string
    pub const fn query_key(&self) -> &'static str {
        match self {
            Dimension::Temperature => "temp",
            Dimension::Humidity => "humidity",
            Dimension::Light => "light",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cycle's raw sensor values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Light intensity in raw units
    pub light: f32,
}

impl SensorReading {
    /// Create a reading
    pub const fn new(temperature: f32, humidity: f32, light: f32) -> Self {
        Self { temperature, humidity, light }
    }

    /// Value for one dimension
    pub const fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Light => self.light,
        }
    }
}

/// Reading plus resolved state, built once per cycle for transmission
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryReport {
    /// Raw values sent as-is (two decimals)
    pub reading: SensorReading,
    /// State resolved this cycle
    pub state: SystemState,
}

impl TelemetryReport {
    /// Pair a reading with its state
    pub const fn new(reading: SensorReading, state: SystemState) -> Self {
        Self { reading, state }
    }

    /// Write `temp=..&humidity=..&light=..&state=..`
    ///
    /// Numbers use fixed two-decimal formatting, the state its wire name.
    pub fn write_query<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for dimension in Dimension::ALL {
            write!(out, "{}={:.2}&", dimension.query_key(), self.reading.get(dimension))?;
        }
        write!(out, "state={}", self.state.name())
    }
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_query(f)
    }
}
