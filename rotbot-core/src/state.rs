//! System alert state
//!
//! Three levels, ordered by severity. The state is what the indicator shows and
//! what the telemetry report carries as `state=GREEN|YELLOW|RED`.

use core::fmt;
use core::str::FromStr;

/// Tri-valued severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SystemState {
    /// Conditions nominal
    Green,
    /// Cautionary, including unrecognised combinations
    Yellow,
    /// Conditions favour spoilage
    Red,
}

impl SystemState {
    /// All states in rule evaluation priority order
    pub const ALL: [SystemState; 3] = [SystemState::Green, SystemState::Yellow, SystemState::Red];

    /// Wire name used in telemetry
    pub const fn name(&self) -> &'static str {
        match self {
            SystemState::Green => "GREEN",
            SystemState::Yellow => "YELLOW",
            SystemState::Red => "RED",
        }
    }

    /// Severity rank, 0 for Green
    pub const fn severity(&self) -> u8 {
        *self as u8
    }

    /// Slot index for per-state tables
    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}

impl Default for SystemState {
    fn default() -> Self {
        SystemState::Green
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised state name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownState;

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown system state")
    }
}

impl FromStr for SystemState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(UnknownState)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SystemState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}
