//! Shared test doubles for the telemetry reporters
//!
//! - `TestServer`: localhost listener answering with a canned response
//! - `MockTransport`: hands out connections that replay a scripted response
//! - `TransportLog`: shared record of connects, writes and closes
//! - `FixedSensors` / `SequenceSensors` / `NullIndicator`: minimal loop collaborators

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rotbot_connectors::{Connection, Endpoint, ReadPoll, Transport, TransportError};
use rotbot_core::{Indicator, SensorError, SensorReading, SensorSource, SystemState};

/// Localhost HTTP server answering every connection with one canned response
pub struct TestServer {
    pub port: u16,
    requests: mpsc::Receiver<String>,
    release: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    /// Answer `connections` requests with `response`, hanging up after each
    pub fn responding(response: &'static str, connections: usize) -> Self {
        Self::start(response, connections, false)
    }

    /// Send `response`, then hold the socket open until [`TestServer::finish`]
    pub fn stalling(response: &'static str) -> Self {
        Self::start(response, 1, true)
    }

    fn start(response: &'static str, connections: usize, stall: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (request_tx, requests) = mpsc::channel();
        let (release, release_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            for _ in 0..connections {
                let Ok((mut socket, _)) = listener.accept() else {
                    return;
                };
                let _ = request_tx.send(read_head(&mut socket));
                let _ = socket.write_all(response.as_bytes());
                if stall {
                    let _ = release_rx.recv_timeout(Duration::from_secs(10));
                }
            }
        });

        Self {
            port,
            requests,
            release,
            handle: Some(handle),
        }
    }

    /// Next request head the server received
    pub fn request(&self) -> String {
        self.requests.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    /// Release a stalled socket and wait for the server thread
    pub fn finish(mut self) {
        let _ = self.release.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0u8; 128];
    while !head.ends_with(b"\r\n\r\n") {
        match socket.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// One scripted poll result
#[derive(Debug, Clone)]
pub enum Step {
    Data(Vec<u8>),
    Pending,
    Closed,
    Error,
}

impl Step {
    pub fn data(text: &str) -> Self {
        Step::Data(text.as_bytes().to_vec())
    }
}

/// What the transport saw
#[derive(Debug, Default)]
pub struct TransportLog {
    pub connects: usize,
    pub closes: usize,
    pub written: Vec<u8>,
}

impl TransportLog {
    pub fn request(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

/// Transport replaying the same response script on every connect
pub struct MockTransport {
    script: Vec<Step>,
    refuse: bool,
    fail_write: bool,
    pub log: Rc<RefCell<TransportLog>>,
}

impl MockTransport {
    pub fn responding(script: Vec<Step>) -> Self {
        Self {
            script,
            refuse: false,
            fail_write: false,
            log: Rc::default(),
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::responding(Vec::new())
        }
    }

    pub fn failing_write() -> Self {
        Self {
            fail_write: true,
            ..Self::responding(Vec::new())
        }
    }

    pub fn log(&self) -> Rc<RefCell<TransportLog>> {
        Rc::clone(&self.log)
    }
}

impl Transport for MockTransport {
    type Connection = MockConnection;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<MockConnection, TransportError> {
        if self.refuse {
            return Err(TransportError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".into(),
            });
        }
        self.log.borrow_mut().connects += 1;
        Ok(MockConnection {
            script: self.script.iter().cloned().collect(),
            fail_write: self.fail_write,
            closed: false,
            log: Rc::clone(&self.log),
        })
    }
}

/// Connection replaying a script; idles forever once it runs out
pub struct MockConnection {
    script: VecDeque<Step>,
    fail_write: bool,
    closed: bool,
    log: Rc<RefCell<TransportLog>>,
}

impl Connection for MockConnection {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.fail_write {
            return Err(TransportError::Write("broken pipe".into()));
        }
        self.log.borrow_mut().written.extend_from_slice(bytes);
        Ok(())
    }

    fn poll_read(&mut self, buf: &mut [u8]) -> Result<ReadPoll, TransportError> {
        match self.script.pop_front() {
            Some(Step::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.script.push_front(Step::Data(bytes.split_off(n)));
                }
                Ok(ReadPoll::Data(n))
            }
            Some(Step::Closed) => Ok(ReadPoll::Closed),
            Some(Step::Error) => Err(TransportError::Read("connection reset".into())),
            Some(Step::Pending) | None => Ok(ReadPoll::Pending),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().closes += 1;
        }
    }
}

/// Sensors returning the same reading forever
pub struct FixedSensors(pub SensorReading);

impl SensorSource for FixedSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.0.temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.0.humidity)
    }

    fn read_light_intensity(&mut self) -> Result<f32, SensorError> {
        Ok(self.0.light)
    }
}

/// Sensors stepping through `readings`, one per cycle, wrapping at the end
pub struct SequenceSensors {
    readings: Vec<SensorReading>,
    cycle: usize,
}

impl SequenceSensors {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings, cycle: 0 }
    }

    fn current(&self) -> SensorReading {
        self.readings[self.cycle % self.readings.len()]
    }
}

impl SensorSource for SequenceSensors {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.current().temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.current().humidity)
    }

    fn read_light_intensity(&mut self) -> Result<f32, SensorError> {
        let light = self.current().light;
        self.cycle += 1;
        Ok(light)
    }
}

/// Indicator that remembers the last state only
#[derive(Default)]
pub struct NullIndicator {
    pub last: Option<SystemState>,
}

impl Indicator for NullIndicator {
    fn set_active(&mut self, state: SystemState) {
        self.last = Some(state);
    }
}

pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 5\r\n\r\nhello";

pub const ERROR_RESPONSE: &str = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\n\r\noops";

/// Reading the reference tables resolve to RED
pub const RED_READING: SensorReading = SensorReading::new(29.5, 56.0, 0.0);

/// Reading the reference tables resolve to GREEN
pub const GREEN_READING: SensorReading = SensorReading::new(21.0, 40.0, 0.0);
