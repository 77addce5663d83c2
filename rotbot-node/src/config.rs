//! Node configuration file
//!
//! One JSON document with four optional sections:
//!
//! ```json
//! {
//!   "classifier": { "temperature": [22, 24, 29, 30], "default_state": "YELLOW" },
//!   "loop": { "cycle_delay_ms": 2000, "indicator_timing": "lagged" },
//!   "reporter": { "host": "192.168.1.20", "port": 5000 },
//!   "script": [ { "temperature": 21.0, "humidity": 40.0, "light": 0.0 } ]
//! }
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use rotbot_connectors::{HttpError, ReporterConfig};
use rotbot_core::{
    ClassifierConfig, ConfigError, Dimension, LoopConfig, SensorReading, StateClassifier,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node errors
#[derive(Debug, Error)]
pub enum NodeError {
    /// Config file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`NodeConfig`]
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Classification tables rejected
    #[error("Invalid classifier configuration: {0}")]
    Classifier(ConfigError),

    /// Reporter settings rejected
    #[error("Invalid reporter configuration: {0}")]
    Reporter(#[from] HttpError),

    /// Script has no readings
    #[error("Sensor script is empty")]
    EmptyScript,

    /// Status board could not start
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// One scripted sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Light intensity in raw sensor units
    pub light: f32,
    /// Make this read fail, leaving the scripted value behind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<Dimension>,
}

impl ScriptEntry {
    /// Successful reading
    pub const fn ok(temperature: f32, humidity: f32, light: f32) -> Self {
        Self {
            temperature,
            humidity,
            light,
            fail: None,
        }
    }

    /// Values as a reading
    pub fn reading(&self) -> SensorReading {
        SensorReading::new(self.temperature, self.humidity, self.light)
    }
}

/// Complete node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub classifier: ClassifierConfig,
    #[serde(rename = "loop")]
    pub loop_config: LoopConfig,
    pub reporter: ReporterConfig,
    pub script: Vec<ScriptEntry>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::reference(),
            loop_config: LoopConfig::default(),
            reporter: ReporterConfig::default(),
            script: vec![
                ScriptEntry::ok(21.0, 40.0, 0.0),
                ScriptEntry::ok(23.5, 54.0, 1299.0),
                ScriptEntry::ok(29.5, 56.0, 0.0),
            ],
        }
    }
}

impl NodeConfig {
    /// Load from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| NodeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load `path`, or use defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, NodeError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the script and reporter sections
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.script.is_empty() {
            return Err(NodeError::EmptyScript);
        }
        self.reporter.validate()?;
        Ok(())
    }

    /// Validate the classification tables and build the classifier
    pub fn classifier(&self) -> Result<StateClassifier, NodeError> {
        StateClassifier::new(self.classifier.clone()).map_err(NodeError::Classifier)
    }
}
