//! Time management for the acquisition loop
//!
//! Two capabilities, kept separate because controllers often provide them
//! from different peripherals:
//! - [`TimeSource`]: a monotonic millisecond counter (response timeouts)
//! - [`Delay`]: blocking sleep (loop period, poll back-off)
//!
//! [`MockClock`] implements both, advancing its counter when asked to sleep, so
//! timeout logic runs instantly and deterministically in tests.

/// Timestamp in milliseconds since an arbitrary start (device boot)
pub type Timestamp = u64;

/// Source of monotonic time
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Milliseconds elapsed since `earlier`
    fn elapsed_since(&self, earlier: Timestamp) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

/// Blocking delay provider
pub trait Delay {
    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Host clock backed by `std::time::Instant` and `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Clock counting from now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

#[cfg(feature = "std")]
impl Delay for SystemClock {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Simulated clock: sleeping advances time, nothing else does
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Timestamp,
    slept_ms: u64,
    sleeps: u32,
}

impl MockClock {
    /// Clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self { now: start, slept_ms: 0, sleeps: 0 }
    }

    /// Move time forward without counting a sleep
    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    /// Total milliseconds spent in [`Delay::delay_ms`]
    pub fn slept_ms(&self) -> u64 {
        self.slept_ms
    }

    /// Number of [`Delay::delay_ms`] calls
    pub fn sleeps(&self) -> u32 {
        self.sleeps
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

impl Delay for MockClock {
    fn delay_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
        self.slept_ms += u64::from(ms);
        self.sleeps += 1;
    }
}
