//! Port interfaces for the push channel

use async_trait::async_trait;
use listsync_domain::{ConnectionState, SyncEvent, SyncResult};

/// One inbound frame from the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrame {
    Text(String),
    /// The peer closed the channel. `code` is the WebSocket close code, if
    /// one was sent.
    Closed { code: Option<u16> },
}

/// An open push channel.
///
/// Adapters swallow transport-level pings and binary frames; only text and
/// close reach the connection manager.
#[async_trait]
pub trait PushChannel: Send {
    async fn send_text(&mut self, text: &str) -> SyncResult<()>;

    /// Next frame. An `Err` means the channel broke and is treated as a close.
    async fn recv(&mut self) -> SyncResult<ChannelFrame>;

    /// Best-effort close; errors are ignored.
    async fn close(&mut self);
}

/// Opens push channels authenticated by an access token.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self, access_token: &str) -> SyncResult<Box<dyn PushChannel>>;
}

/// Collaborator that reconciles local state when the server signals a change.
///
/// Called from the connection task; implementations should hand work off
/// rather than block.
pub trait PushSignalHandler: Send + Sync {
    fn on_signal(&self, event: SyncEvent);

    /// Connection lifecycle hook. A transition back to `Connected` after a
    /// drop is the cue to re-fetch anything that may have been missed.
    fn on_state_change(&self, _state: ConnectionState) {}
}
