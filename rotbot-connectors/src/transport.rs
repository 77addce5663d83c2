//! Connection-oriented transport seam
//!
//! Boards whose network stack lives outside `std` (a Wi-Fi co-processor, an
//! `embedded-nal` socket) implement [`Transport`] and [`Connection`] and
//! report through [`StreamReporter`](crate::stream::StreamReporter). Hosts
//! use the `ureq`-backed [`HttpReporter`](crate::http::HttpReporter) instead.
//!
//! Four primitives are needed: connect, write, non-blocking read and close.
//!
//! Reads never block. [`Connection::poll_read`] reports whether bytes arrived,
//! nothing is waiting yet, or the peer closed the stream; the caller owns the
//! waiting policy.

use thiserror::Error;

/// Transport-level errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish the connection
    #[error("Connect to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Write failed part-way
    #[error("Write failed: {0}")]
    Write(String),

    /// Read failed (not a clean close)
    #[error("Read failed: {0}")]
    Read(String),
}

/// Remote host and port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Result of one non-blocking read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPoll {
    /// This many bytes were copied into the buffer
    Data(usize),
    /// Nothing available yet, connection still open
    Pending,
    /// Peer closed and nothing is left to read
    Closed,
}

/// An open connection
pub trait Connection {
    /// Write the whole buffer
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read whatever is available without blocking
    fn poll_read(&mut self, buf: &mut [u8]) -> Result<ReadPoll, TransportError>;

    /// Release the connection; must be idempotent
    fn close(&mut self);
}

/// Connection factory
pub trait Transport {
    /// Connection type produced
    type Connection: Connection;

    /// Open a fresh connection to `endpoint`
    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Connection, TransportError>;
}
