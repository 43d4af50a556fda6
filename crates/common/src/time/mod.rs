//! Wall-clock abstraction
//!
//! Operation metadata carries a wall-clock creation time. Reading it through
//! [`Clock`] keeps that stamp deterministic in tests.

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
