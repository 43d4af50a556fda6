//! Modular common utilities shared across listsync crates.
//!
//! Nothing in here knows about lists, recipes or the hosted service. The
//! crate holds the generic admission, backoff and clock primitives that the
//! sync engine in `listsync-core` is assembled from.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error types and the pure reconnect backoff sequence
//! - `runtime`: tokio-backed primitives (concurrency limiter, clocks)
//! - `observability`: optional tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod resilience;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use resilience::{BackoffError, ReconnectBackoff};
#[cfg(feature = "runtime")]
pub use resilience::{ConcurrencyLimiter, LimiterError, LimiterMetrics};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
