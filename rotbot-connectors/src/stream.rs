//! Telemetry reporter over a board-provided [`Transport`]
//!
//! Used where `ureq` cannot run: the board hands over raw connect, write and
//! non-blocking read primitives, and this module speaks just enough HTTP/1.1
//! to send the report and confirm a 2xx status.
//!
//! ```text
//! connect ─▶ write request ─▶ status line ─▶ skip headers ─▶ drain body ─▶ close
//!    │             │               │               │              │
//!  error         error      error / non-2xx      error     error / idle
//!    └─────────────┴───────────────┴───────────────┴──────────────┴──▶ close
//! ```
//!
//! Every read stage polls without blocking. When nothing is waiting the
//! reporter sleeps for `poll_interval_ms` and polls again; if
//! `inactivity_timeout_ms` passes without a single byte the stage times out.
//! Any received data restarts the window. The connection lives inside a guard
//! that closes it on drop, so early returns release it like the success path.

use std::ops::{Deref, DerefMut};

use rotbot_core::time::{Delay, TimeSource, Timestamp};
use rotbot_core::{TelemetryReport, TelemetrySink};

use crate::report::{record, BodyDrain, HttpError, ReportSummary, ReporterConfig, ResponseStage};
use crate::transport::{Connection, Endpoint, ReadPoll, Transport, TransportError};
use crate::ConnectionStats;

/// Longest status line accepted
const MAX_STATUS_LINE: usize = 256;

/// Read chunk size
const READ_CHUNK: usize = 256;

/// Closes the wrapped connection when dropped
struct ConnectionGuard<C: Connection> {
    inner: C,
}

impl<C: Connection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Connection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// One polled byte
enum Polled {
    Byte(u8),
    Closed,
    TimedOut,
}

/// Byte-at-a-time response reader with an inactivity window
struct ResponseReader<'a, C: Connection, K: TimeSource + Delay> {
    conn: &'a mut C,
    clock: &'a mut K,
    inactivity_timeout_ms: u32,
    poll_interval_ms: u32,
    buf: [u8; READ_CHUNK],
    pos: usize,
    len: usize,
    last_activity: Timestamp,
}

impl<'a, C: Connection, K: TimeSource + Delay> ResponseReader<'a, C, K> {
    fn new(conn: &'a mut C, clock: &'a mut K, config: &ReporterConfig) -> Self {
        let last_activity = clock.now();
        Self {
            conn,
            clock,
            inactivity_timeout_ms: config.inactivity_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
            buf: [0; READ_CHUNK],
            pos: 0,
            len: 0,
            last_activity,
        }
    }

    fn next_byte(&mut self) -> Result<Polled, TransportError> {
        loop {
            if self.pos < self.len {
                let byte = self.buf[self.pos];
                self.pos += 1;
                return Ok(Polled::Byte(byte));
            }

            match self.conn.poll_read(&mut self.buf)? {
                ReadPoll::Data(n) => {
                    self.pos = 0;
                    self.len = n.min(READ_CHUNK);
                    self.last_activity = self.clock.now();
                }
                ReadPoll::Closed => return Ok(Polled::Closed),
                ReadPoll::Pending => {
                    if self.clock.elapsed_since(self.last_activity)
                        >= u64::from(self.inactivity_timeout_ms)
                    {
                        return Ok(Polled::TimedOut);
                    }
                    self.clock.delay_ms(self.poll_interval_ms);
                }
            }
        }
    }

    fn stage_byte(&mut self, stage: ResponseStage) -> Result<Option<u8>, HttpError> {
        match self.next_byte().map_err(|e| HttpError::Read(e.to_string()))? {
            Polled::Byte(byte) => Ok(Some(byte)),
            Polled::Closed if stage == ResponseStage::Body => Ok(None),
            Polled::Closed => Err(HttpError::ConnectionClosed { stage }),
            Polled::TimedOut => Err(HttpError::Timeout {
                stage,
                timeout_ms: self.inactivity_timeout_ms,
            }),
        }
    }

    fn status_code(&mut self) -> Result<u16, HttpError> {
        let mut line = Vec::with_capacity(64);
        while let Some(byte) = self.stage_byte(ResponseStage::StatusLine)? {
            if byte == b'\n' {
                break;
            }
            if line.len() >= MAX_STATUS_LINE {
                return Err(HttpError::MalformedStatus(String::from_utf8_lossy(&line).into_owned()));
            }
            line.push(byte);
        }
        parse_status_line(&String::from_utf8_lossy(&line))
    }

    fn skip_headers(&mut self) -> Result<(), HttpError> {
        // The status line's own LF counts; a second LF with nothing but CR
        // in between ends the block
        let mut newlines = 1;
        while let Some(byte) = self.stage_byte(ResponseStage::Headers)? {
            match byte {
                b'\n' => {
                    newlines += 1;
                    if newlines == 2 {
                        break;
                    }
                }
                b'\r' => {}
                _ => newlines = 0,
            }
        }
        Ok(())
    }

    fn drain_body(&mut self) -> Result<BodyDrain, HttpError> {
        let mut drain = BodyDrain::default();
        while let Some(byte) = self.stage_byte(ResponseStage::Body)? {
            drain.extend(&[byte]);
        }
        Ok(drain)
    }
}

/// Parse `HTTP/1.x NNN reason` into the status code
fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    let malformed = || HttpError::MalformedStatus(line.trim_end().to_string());
    let mut parts = line.trim_end().splitn(3, ' ');
    let version = parts.next().ok_or_else(malformed)?;
    if !version.starts_with("HTTP/") {
        return Err(malformed());
    }
    let code = parts.next().ok_or_else(malformed)?;
    if code.len() != 3 {
        return Err(malformed());
    }
    code.parse().map_err(|_| malformed())
}

/// Telemetry reporter speaking HTTP/1.1 over any [`Transport`]
pub struct StreamReporter<T: Transport, K: TimeSource + Delay> {
    config: ReporterConfig,
    endpoint: Endpoint,
    transport: T,
    clock: K,
    stats: ConnectionStats,
}

impl<T: Transport, K: TimeSource + Delay> StreamReporter<T, K> {
    /// Create a reporter; fails on a config that could never deliver
    pub fn new(config: ReporterConfig, transport: T, clock: K) -> Result<Self, HttpError> {
        config.validate()?;
        Ok(Self {
            endpoint: config.endpoint(),
            config,
            transport,
            clock,
            stats: ConnectionStats::default(),
        })
    }

    /// Delivery statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Clock used for timeouts
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Render the request for `report`
    pub fn build_request(&self, report: &TelemetryReport) -> Result<String, HttpError> {
        let target = self.config.request_target(report)?;
        Ok(format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\n\r\n",
            target, self.endpoint, self.config.user_agent
        ))
    }

    /// Send one report and consume the response
    pub fn report(&mut self, report: &TelemetryReport) -> Result<ReportSummary, HttpError> {
        let result = self.exchange(report);
        record(&mut self.stats, &self.endpoint, result)
    }

    fn exchange(&mut self, report: &TelemetryReport) -> Result<ReportSummary, HttpError> {
        let request = self.build_request(report)?;

        let conn = self
            .transport
            .connect(&self.endpoint)
            .map_err(|e| HttpError::Connect(e.to_string()))?;
        let mut conn = ConnectionGuard { inner: conn };

        conn.write_all(request.as_bytes())
            .map_err(|e| HttpError::Request(e.to_string()))?;
        self.stats.bytes_sent += request.len() as u64;

        let mut reader = ResponseReader::new(&mut conn.inner, &mut self.clock, &self.config);
        let status = reader.status_code()?;
        if !(200..300).contains(&status) {
            return Err(HttpError::Status { status });
        }
        reader.skip_headers()?;
        Ok(reader.drain_body()?.finish(status))
    }
}

impl<T: Transport, K: TimeSource + Delay> TelemetrySink for StreamReporter<T, K> {
    type Error = HttpError;

    fn submit(&mut self, report: &TelemetryReport) -> Result<(), Self::Error> {
        self.report(report).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_lines() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r").unwrap(), 200);
        assert_eq!(parse_status_line("HTTP/1.0 404 Not Found").unwrap(), 404);
        assert_eq!(parse_status_line("HTTP/1.1 204").unwrap(), 204);
        assert!(parse_status_line("SSH-2.0-OpenSSH").is_err());
        assert!(parse_status_line("HTTP/1.1 20 OK").is_err());
        assert!(parse_status_line("HTTP/1.1 abc OK").is_err());
    }
}
