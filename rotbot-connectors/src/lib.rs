//! Telemetry Connectors for RotBot
//!
//! ## Overview
//!
//! Once per cycle the node reports its raw reading and resolved state to a
//! fixed remote endpoint. This crate provides the pieces:
//!
//! - [`http`]: the host reporter, a `ureq` agent sending one `GET` per cycle
//! - [`stream`]: the same exchange over a board-provided [`Transport`]
//! - [`report`]: configuration, errors and statistics shared by both
//! - [`dashboard`]: the receiving side's last-known-status board
//!
//! ## Wire Format
//!
//! ```text
//! GET /?temp=23.50&humidity=54.00&light=1299.00&state=YELLOW HTTP/1.1
//! Host: rotbot.local:5000
//! Connection: close
//! ```
//!
//! The response is never interpreted beyond its status code; the body is only
//! echoed to the debug log.
//!
//! ## Failure Handling
//!
//! - Connect failure, non-2xx status, stalled response: logged, report dropped
//! - No retries inside a cycle; the next cycle is the retry
//! - The connection is closed on every exit path
//!
//! ## Example Usage
//!
//! ```no_run
//! use rotbot_connectors::http::HttpReporter;
//! use rotbot_connectors::report::ReporterConfig;
//! use rotbot_core::{SensorReading, SystemState, TelemetryReport};
//!
//! let config = ReporterConfig::new("192.168.1.20", 5000);
//! let mut reporter = HttpReporter::new(config)?;
//!
//! let report = TelemetryReport::new(SensorReading::new(23.5, 54.0, 1299.0), SystemState::Yellow);
//! match reporter.report(&report) {
//!     Ok(summary) => println!("server answered {}", summary.status),
//!     Err(e) => println!("dropped: {}", e),
//! }
//! # Ok::<(), rotbot_connectors::HttpError>(())
//! ```

pub mod report;
pub mod stream;
pub mod transport;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "dashboard")]
pub mod dashboard;

// Re-export common types
pub use report::{HttpError, ReportSummary, ReporterConfig, ResponseStage};
pub use stream::StreamReporter;
pub use transport::{Connection, Endpoint, ReadPoll, Transport, TransportError};

#[cfg(feature = "http")]
pub use http::HttpReporter;

#[cfg(feature = "dashboard")]
pub use dashboard::{StatusBoard, TextColor};

/// Delivery statistics kept by a reporter
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Reports acknowledged with a 2xx status and a complete body
    pub messages_sent: u64,
    /// Reports dropped for any reason
    pub messages_failed: u64,
    /// Request bytes written by a [`StreamReporter`]
    pub bytes_sent: u64,
    /// Responses whose body stalled until the inactivity timeout (also failed)
    pub body_timeouts: u64,
    /// Last error message
    pub last_error: Option<String>,
}
