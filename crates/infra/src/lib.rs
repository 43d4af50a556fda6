//! # ListSync Infrastructure
//!
//! Adapters for the ports defined in `listsync-core`.
//!
//! This crate contains:
//! - [`ApiClient`]: reqwest transport with credential headers, the shared
//!   concurrency limiter and a single refresh-and-retry on 401
//! - [`HttpTokenRefresher`]: the token refresh endpoint
//! - [`WebSocketConnector`]: tokio-tungstenite push channel
//! - [`JsonOperationCodec`]: JSON batch and acknowledgement encoding
//! - Configuration loading and tracing setup
//! - [`ListSyncClient`]: the composition root
//!
//! ## Architecture
//! - Implements traits defined in `listsync-core`
//! - Contains all network and file I/O

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod realtime;
pub mod sync;

// Re-export commonly used items
pub use api::{ApiClient, HttpTokenRefresher};
pub use client::{ListSyncClient, ListSyncClientBuilder, LoggingSignalHandler};
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::init_tracing;
pub use realtime::{WebSocketChannel, WebSocketConnector};
pub use sync::JsonOperationCodec;
