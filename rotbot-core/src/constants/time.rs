//! Time-Related Constants
//!
//! Loop period and network timeouts, all in milliseconds.

/// Delay between acquisition cycles (milliseconds).
///
/// DHT-family humidity sensors need at least 2 s between samples; polling
/// faster only returns the cached (stale) value.
///
/// Source: DHT22/AM2302 datasheet minimum sampling period
pub const DEFAULT_CYCLE_DELAY_MS: u32 = 2000;

/// Budget for establishing the telemetry connection (milliseconds).
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 10_000;

/// Give up on a response after this long without a single byte (milliseconds).
///
/// Every received byte restarts the window.
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u32 = 30_000;

/// Sleep between polls when no response data is waiting (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1000;
