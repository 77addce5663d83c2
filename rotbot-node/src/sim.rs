//! Host stand-ins for the sensor and LED hardware

use rotbot_core::{
    Dimension, Indicator, SensorError, SensorErrorKind, SensorSource, SystemState,
};
use tracing::{debug, info};

use crate::config::ScriptEntry;

/// Sensors cycling through a scripted list of readings
///
/// The loop reads temperature, humidity and light in that order; the script
/// advances after the light read.
pub struct ScriptedSensors {
    script: Vec<ScriptEntry>,
    position: usize,
}

impl ScriptedSensors {
    /// Sensors replaying `script` in a loop; an empty script reads all zeros
    pub fn new(script: Vec<ScriptEntry>) -> Self {
        Self { script, position: 0 }
    }

    fn current(&self) -> ScriptEntry {
        self.script
            .get(self.position)
            .copied()
            .unwrap_or(ScriptEntry::ok(0.0, 0.0, 0.0))
    }

    fn read(&self, dimension: Dimension) -> Result<f32, SensorError> {
        let entry = self.current();
        let value = entry.reading().get(dimension);
        if entry.fail == Some(dimension) {
            Err(SensorError::new(dimension, SensorErrorKind::Stale, value))
        } else {
            Ok(value)
        }
    }
}

impl SensorSource for ScriptedSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.read(Dimension::Temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.read(Dimension::Humidity)
    }

    fn read_light_intensity(&mut self) -> Result<f32, SensorError> {
        let result = self.read(Dimension::Light);
        if !self.script.is_empty() {
            self.position = (self.position + 1) % self.script.len();
        }
        result
    }
}

/// Indicator that logs which of the three outputs is lit
#[derive(Debug, Default)]
pub struct LogIndicator {
    active: Option<SystemState>,
}

impl LogIndicator {
    /// Indicator with every output off
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently lit output
    #[cfg(test)]
    pub fn active(&self) -> Option<SystemState> {
        self.active
    }

    /// Output levels in GREEN, YELLOW, RED order
    #[cfg(test)]
    pub fn outputs(&self) -> [bool; 3] {
        SystemState::ALL.map(|state| self.active == Some(state))
    }
}

impl Indicator for LogIndicator {
    fn set_active(&mut self, state: SystemState) {
        if self.active != Some(state) {
            info!("Indicator switched to {}", state);
        } else {
            debug!("Indicator holds {}", state);
        }
        self.active = Some(state);
    }
}
