//! Exponential reconnect delay with a floor and a ceiling
//!
//! The sequence starts at the floor, doubles after every failed attempt and
//! saturates at the ceiling. A successful connection resets it to the floor.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use listsync_common::resilience::ReconnectBackoff;
//!
//! let mut backoff = ReconnectBackoff::default();
//! assert_eq!(backoff.next_delay(), Duration::from_millis(500));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
//! backoff.reset();
//! assert_eq!(backoff.next_delay(), Duration::from_millis(500));
//! ```

use std::time::Duration;

use thiserror::Error;

/// Default first delay after a connection closes.
pub const DEFAULT_FLOOR: Duration = Duration::from_millis(500);
/// Default upper bound for the reconnect delay.
pub const DEFAULT_CEILING: Duration = Duration::from_secs(120);

/// Invalid backoff bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackoffError {
    #[error("backoff floor must be greater than zero")]
    ZeroFloor,
    #[error("backoff floor {floor:?} exceeds ceiling {ceiling:?}")]
    FloorAboveCeiling { floor: Duration, ceiling: Duration },
}

/// Doubling delay sequence bounded by `[floor, ceiling]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectBackoff {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self { floor: DEFAULT_FLOOR, ceiling: DEFAULT_CEILING, current: DEFAULT_FLOOR }
    }
}

impl ReconnectBackoff {
    /// Create a backoff with custom bounds.
    pub fn new(floor: Duration, ceiling: Duration) -> Result<Self, BackoffError> {
        if floor.is_zero() {
            return Err(BackoffError::ZeroFloor);
        }
        if floor > ceiling {
            return Err(BackoffError::FloorAboveCeiling { floor, ceiling });
        }
        Ok(Self { floor, ceiling, current: floor })
    }

    /// Delay to wait before the next attempt.
    ///
    /// Returns the current delay and doubles the stored value for the
    /// attempt after, capped at the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        delay
    }

    /// Delay the next call to [`next_delay`](Self::next_delay) will return.
    pub const fn current(&self) -> Duration {
        self.current
    }

    /// Back to the floor, called once a connection is open.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    pub const fn floor(&self) -> Duration {
        self.floor
    }

    pub const fn ceiling(&self) -> Duration {
        self.ceiling
    }
}
