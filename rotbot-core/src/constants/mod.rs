//! Constants for RotBot Core
//!
//! Every numeric default lives here with a note on where it comes from, so that
//! classification logic never carries magic numbers.
//!
//! ## Organization
//!
//! - **Reference**: the consolidated boundary lists and rule tables
//! - **Time**: loop period and network timeouts
//! - **Buffers**: capacities of the bounded tables

/// Reference boundary lists and rule tables.
pub mod reference;

/// Loop period and telemetry timeouts.
pub mod time;

/// Capacities of heap-free tables.
pub mod buffers;

pub use buffers::{MAX_BOUNDARIES, MAX_RULES_PER_STATE};
pub use time::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_CYCLE_DELAY_MS, DEFAULT_INACTIVITY_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS,
};
