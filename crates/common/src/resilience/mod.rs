//! Resilience primitives for the sync engine
//!
//! - **Concurrency limiter**: bounds how many requests against one named
//!   resource are in flight at once, releasing queued callers in arrival
//!   order.
//! - **Reconnect backoff**: the doubling delay sequence used between
//!   attempts to re-open a persistent connection.
//!
//! Both are generic; the domain-specific wiring lives in `listsync-core`.

pub mod backoff;
#[cfg(feature = "runtime")]
pub mod limiter;

pub use backoff::{BackoffError, ReconnectBackoff};
#[cfg(feature = "runtime")]
pub use limiter::{ConcurrencyLimiter, LimiterError, LimiterMetrics};
