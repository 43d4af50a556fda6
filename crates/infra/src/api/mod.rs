//! Hosted API adapters
//!
//! - [`ApiClient`]: the [`ApiTransport`](listsync_core::ApiTransport) used by
//!   every queue and the share call
//! - [`HttpTokenRefresher`]: the refresh endpoint behind the token authority

pub mod auth;
pub mod client;

pub use auth::HttpTokenRefresher;
pub use client::ApiClient;
