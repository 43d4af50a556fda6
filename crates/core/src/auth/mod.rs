//! Credential lifecycle
//!
//! [`TokenAuthority`] owns the access/refresh pair. Every outbound request
//! reads its headers; a rejected token funnels into a single refresh no
//! matter how many callers noticed the rejection at once.

pub mod authority;
pub mod ports;

pub use authority::TokenAuthority;
pub use ports::{SessionObserver, TokenRefresher};
