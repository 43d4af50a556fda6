//! # ListSync Core
//!
//! Sync engine behind port traits - no HTTP or WebSocket code.
//!
//! This crate contains:
//! - [`TokenAuthority`]: credential owner with single-flight refresh
//! - [`OperationQueue`]: per-domain pending set, batching and acknowledgement
//!   matching
//! - [`ConnectionManager`]: push channel with heartbeat and reconnect backoff
//! - Domain managers that build operation payloads
//!
//! ## Architecture Principles
//! - Depends only on `listsync-common` and `listsync-domain`
//! - Network access goes through [`ApiTransport`], [`ChannelConnector`] and
//!   [`TokenRefresher`]
//! - Timers use `tokio::time`, so tests drive them with a paused clock

pub mod auth;
pub mod managers;
pub mod realtime;
pub mod sync;

pub use auth::{SessionObserver, TokenAuthority, TokenRefresher};
pub use managers::{CategoryManager, MealPlanManager, RecipeManager, ShoppingListManager};
pub use realtime::{
    ChannelConnector, ChannelFrame, ConnectionManager, HeartbeatWatchdog, PushChannel,
    PushSignalHandler,
};
pub use sync::{
    ApiRequest, ApiTransport, DeliveryPolicy, OperationCodec, OperationQueue, PendingSet,
    QueueWorker, SyncOutcome,
};
