//! Push channel: connect, heartbeat liveness and reconnect with backoff

pub mod heartbeat;
pub mod manager;
pub mod ports;

pub use heartbeat::HeartbeatWatchdog;
pub use manager::ConnectionManager;
pub use ports::{ChannelConnector, ChannelFrame, PushChannel, PushSignalHandler};
