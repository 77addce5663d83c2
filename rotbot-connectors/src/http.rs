//! HTTP Telemetry Reporter
//!
//! ## Overview
//!
//! Sends one `GET` per cycle carrying the reading and state as query
//! parameters, then reads the response just far enough to log it. The reporter
//! sits at the end of the cycle and its outcome is informational only: it
//! receives the report by shared reference and has no path back to the
//! classifier.
//!
//! ## Timeouts
//!
//! The `ureq` agent is built with:
//! - `timeout_connect`: `connect_timeout_ms`, per resolved address
//! - `timeout_read`: `inactivity_timeout_ms`, applied to every socket read,
//!   so any received data restarts the window
//!
//! Name resolution runs on a helper thread bounded by the same connect budget.
//!
//! ## Resource Release
//!
//! Every request carries `Connection: close` and the agent keeps no idle
//! connections, so dropping the response (on any path) closes the socket.

use std::error::Error;
use std::io::{self, Read};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;

use rotbot_core::{TelemetryReport, TelemetrySink};

use crate::report::{record, BodyDrain, HttpError, ReportSummary, ReporterConfig, ResponseStage};
use crate::transport::Endpoint;
use crate::ConnectionStats;

/// Read chunk size
const READ_CHUNK: usize = 256;

/// DNS lookup bounded by the connect budget
struct BoundedResolver {
    timeout: Duration,
}

impl ureq::Resolver for BoundedResolver {
    fn resolve(&self, netloc: &str) -> io::Result<Vec<SocketAddr>> {
        let (tx, rx) = mpsc::channel();
        let netloc = netloc.to_string();
        thread::spawn(move || {
            let _ = tx.send(netloc.to_socket_addrs().map(|addrs| addrs.collect()));
        });
        rx.recv_timeout(self.timeout).map_err(|_| {
            io::Error::new(io::ErrorKind::TimedOut, "name resolution timed out")
        })?
    }
}

/// Whether any I/O error in the chain has a kind accepted by `matches`
fn io_kind_in_chain(err: &(dyn Error + 'static), matches: fn(io::ErrorKind) -> bool) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        match e.downcast_ref::<io::Error>() {
            Some(io) => {
                if matches(io.kind()) {
                    return true;
                }
                // io::Error::source skips the wrapped error itself
                current = match io.get_ref() {
                    Some(inner) => Some(inner as &(dyn Error + 'static)),
                    None => io.source(),
                };
            }
            None => current = e.source(),
        }
    }
    false
}

/// Read timed out somewhere below
fn is_timeout(err: &(dyn Error + 'static)) -> bool {
    io_kind_in_chain(err, |kind| {
        matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
    })
}

/// Peer hung up mid-response
fn is_closed(err: &(dyn Error + 'static)) -> bool {
    io_kind_in_chain(err, |kind| {
        matches!(
            kind,
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::UnexpectedEof
        )
    })
}

/// Telemetry reporter on a `ureq` agent
pub struct HttpReporter {
    config: ReporterConfig,
    endpoint: Endpoint,
    agent: ureq::Agent,
    stats: ConnectionStats,
}

impl HttpReporter {
    /// Create a reporter; fails on a config that could never deliver
    pub fn new(config: ReporterConfig) -> Result<Self, HttpError> {
        config.validate()?;

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.inactivity_timeout())
            .timeout_write(config.inactivity_timeout())
            .resolver(BoundedResolver { timeout: config.connect_timeout() })
            .max_idle_connections(0)
            .redirects(0)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            endpoint: config.endpoint(),
            config,
            agent,
            stats: ConnectionStats::default(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Delivery statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Full URL for `report`
    pub fn url(&self, report: &TelemetryReport) -> Result<String, HttpError> {
        let target = self.config.request_target(report)?;
        Ok(format!("http://{}{}", self.endpoint, target))
    }

    /// Send one report and consume the response
    pub fn report(&mut self, report: &TelemetryReport) -> Result<ReportSummary, HttpError> {
        let result = self.exchange(report);
        record(&mut self.stats, &self.endpoint, result)
    }

    fn exchange(&self, report: &TelemetryReport) -> Result<ReportSummary, HttpError> {
        let url = self.url(report)?;
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .set("Connection", "close")
            .call()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(HttpError::Status { status });
        }

        let mut body = response.into_reader();
        let mut chunk = [0u8; READ_CHUNK];
        let mut drain = BodyDrain::default();
        loop {
            match body.read(&mut chunk) {
                Ok(0) => return Ok(drain.finish(status)),
                Ok(n) => drain.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if is_timeout(&e) => {
                    debug!("Body stalled after {} bytes", drain.count);
                    return Err(HttpError::Timeout {
                        stage: ResponseStage::Body,
                        timeout_ms: self.config.inactivity_timeout_ms,
                    });
                }
                Err(e) if is_closed(&e) => {
                    return Err(HttpError::ConnectionClosed { stage: ResponseStage::Body })
                }
                Err(e) => return Err(HttpError::Read(e.to_string())),
            }
        }
    }

    fn classify(&self, err: ureq::Error) -> HttpError {
        let transport = match err {
            ureq::Error::Status(status, _) => return HttpError::Status { status },
            ureq::Error::Transport(transport) => transport,
        };

        match transport.kind() {
            ureq::ErrorKind::Dns
            | ureq::ErrorKind::ConnectionFailed
            | ureq::ErrorKind::InvalidUrl
            | ureq::ErrorKind::UnknownScheme => HttpError::Connect(transport.to_string()),
            ureq::ErrorKind::BadStatus => HttpError::MalformedStatus(transport.to_string()),
            _ if is_timeout(&transport) => HttpError::Timeout {
                stage: ResponseStage::Head,
                timeout_ms: self.config.inactivity_timeout_ms,
            },
            _ if is_closed(&transport) => HttpError::ConnectionClosed { stage: ResponseStage::Head },
            _ => HttpError::Read(transport.to_string()),
        }
    }
}

impl TelemetrySink for HttpReporter {
    type Error = HttpError;

    fn submit(&mut self, report: &TelemetryReport) -> Result<(), Self::Error> {
        self.report(report).map(|_| ())
    }
}
