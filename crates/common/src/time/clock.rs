//! Time source for wall-clock stamps
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use listsync_common::time::{Clock, MockClock, SystemClock};
//!
//! // Use system clock in production
//! let clock = SystemClock;
//! assert!(clock.millis_since_epoch() > 0);
//!
//! // Use mock clock in tests
//! let mock = MockClock::at_millis(1_700_000_000_000);
//! mock.advance(Duration::from_secs(5));
//! assert_eq!(mock.millis_since_epoch(), 1_700_000_005_000);
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn system_time(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch, zero for times before it.
    fn millis_since_epoch(&self) -> u64 {
        let millis = self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same time, so a clone handed to the code under test
/// observes every [`advance`](Self::advance) made by the test.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<SystemTime>>,
}

impl MockClock {
    /// Start the clock at the real current time.
    pub fn new() -> Self {
        Self { current: Arc::new(Mutex::new(SystemTime::now())) }
    }

    /// Start the clock at a fixed point, in milliseconds since the epoch.
    pub fn at_millis(millis: u64) -> Self {
        Self { current: Arc::new(Mutex::new(UNIX_EPOCH + Duration::from_millis(millis))) }
    }

    /// Simulate time passing without waiting.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current += duration;
    }

    /// Jump to an absolute time.
    pub fn set(&self, time: SystemTime) {
        *self.current.lock() = time;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn system_time(&self) -> SystemTime {
        *self.current.lock()
    }
}
