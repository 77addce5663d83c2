//! Reporter configuration, errors and bookkeeping shared by both reporters
//!
//! [`HttpReporter`](crate::http::HttpReporter) talks to the network through
//! `ureq`; [`StreamReporter`](crate::stream::StreamReporter) drives any
//! [`Transport`](crate::transport::Transport) a board provides. Both render
//! the same request, fail with the same [`HttpError`] and keep the same
//! [`ConnectionStats`].

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rotbot_core::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_INACTIVITY_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
};
use rotbot_core::TelemetryReport;

use crate::transport::Endpoint;
use crate::ConnectionStats;

/// Body bytes kept for the debug echo
pub(crate) const MAX_BODY_ECHO: usize = 512;

/// Which part of the response was being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStage {
    /// Status line and headers, when the client reads them as one unit
    Head,
    /// `HTTP/1.1 200 OK`
    StatusLine,
    /// Header block up to the blank line
    Headers,
    /// Everything after the headers
    Body,
}

impl std::fmt::Display for ResponseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResponseStage::Head => "response head",
            ResponseStage::StatusLine => "status line",
            ResponseStage::Headers => "headers",
            ResponseStage::Body => "body",
        })
    }
}

/// HTTP reporting errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Reporter configuration rejected
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not resolve or connect
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Request could not be written
    #[error("Request failed: {0}")]
    Request(String),

    /// Transport error while reading the response
    #[error("Response read failed: {0}")]
    Read(String),

    /// No data for the whole inactivity window
    #[error("No response data for {timeout_ms}ms while reading {stage}")]
    Timeout { stage: ResponseStage, timeout_ms: u32 },

    /// Peer closed before the stage completed
    #[error("Connection closed while reading {stage}")]
    ConnectionClosed { stage: ResponseStage },

    /// Status line did not parse
    #[error("Malformed status line: {0}")]
    MalformedStatus(String),

    /// Server answered with a non-2xx status
    #[error("Server returned status {status}")]
    Status { status: u16 },

    /// Rendered request exceeds the configured limit
    #[error("Request of {len} bytes exceeds limit of {max}")]
    RequestTooLarge { len: usize, max: usize },
}

/// Reporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Endpoint host
    pub host: String,
    /// Endpoint port
    pub port: u16,
    /// Request path; the query string is appended
    pub path: String,
    /// Budget for name resolution and connecting
    pub connect_timeout_ms: u32,
    /// Give up after this long without response data
    pub inactivity_timeout_ms: u32,
    /// Sleep between empty polls on a [`Transport`](crate::transport::Transport)
    pub poll_interval_ms: u32,
    /// Upper bound on the rendered request target
    pub max_request_len: usize,
    /// User agent string
    pub user_agent: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5000,
            path: "/".into(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_request_len: 1024,
            user_agent: format!("RotBot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ReporterConfig {
    /// Configuration for `host:port` with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the request path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the inactivity timeout in milliseconds
    pub fn inactivity_timeout_ms(mut self, ms: u32) -> Self {
        self.inactivity_timeout_ms = ms;
        self
    }

    /// Set the empty-poll sleep in milliseconds
    pub fn poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Reject settings that would make every report fail
    pub fn validate(&self) -> Result<(), HttpError> {
        if self.host.trim().is_empty() {
            return Err(HttpError::Config("host must not be empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(HttpError::Config(format!("path {:?} must start with '/'", self.path)));
        }
        for (name, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("inactivity_timeout_ms", self.inactivity_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(HttpError::Config(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }

    /// Endpoint to connect to
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.connect_timeout_ms))
    }

    /// Inactivity timeout as a `Duration`
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.inactivity_timeout_ms))
    }

    /// Path plus query for `report`, bounded by `max_request_len`
    pub fn request_target(&self, report: &TelemetryReport) -> Result<String, HttpError> {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        let target = format!("{}{}{}", self.path, separator, report);
        if target.len() > self.max_request_len {
            return Err(HttpError::RequestTooLarge {
                len: target.len(),
                max: self.max_request_len,
            });
        }
        Ok(target)
    }
}

/// Result of a delivered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// HTTP status code
    pub status: u16,
    /// Body bytes received
    pub body_bytes: usize,
    /// Leading part of the body, lossily decoded
    pub body_echo: String,
}

/// Collects the body and its debug echo
#[derive(Debug, Default)]
pub(crate) struct BodyDrain {
    pub(crate) count: usize,
    echo: Vec<u8>,
}

impl BodyDrain {
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.count += bytes.len();
        let room = MAX_BODY_ECHO.saturating_sub(self.echo.len());
        self.echo.extend_from_slice(&bytes[..room.min(bytes.len())]);
    }

    pub(crate) fn finish(self, status: u16) -> ReportSummary {
        ReportSummary {
            status,
            body_bytes: self.count,
            body_echo: String::from_utf8_lossy(&self.echo).into_owned(),
        }
    }
}

/// Update `stats` and log the outcome of one exchange
pub(crate) fn record(
    stats: &mut ConnectionStats,
    endpoint: &Endpoint,
    result: Result<ReportSummary, HttpError>,
) -> Result<ReportSummary, HttpError> {
    match result {
        Ok(summary) => {
            stats.messages_sent += 1;
            debug!("{} {}: {}", endpoint, summary.status, summary.body_echo);
            Ok(summary)
        }
        Err(e) => {
            stats.messages_failed += 1;
            if let HttpError::Timeout { stage: ResponseStage::Body, .. } = e {
                stats.body_timeouts += 1;
            }
            stats.last_error = Some(e.to_string());
            warn!("Telemetry to {} failed: {}", endpoint, e);
            Err(e)
        }
    }
}
