//! WebSocket push channel
//!
//! The access token travels in the connect URI, so every reconnect builds a
//! fresh URL from whatever token the authority holds at that moment.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use listsync_core::{ChannelConnector, ChannelFrame, PushChannel};
use listsync_domain::{SyncError, SyncResult};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, trace};
use url::Url;
use uuid::Uuid;

use crate::errors::InfraError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens push channels against the listener endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    endpoint: Url,
    client_identifier: Uuid,
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(endpoint: &str, client_identifier: Uuid) -> SyncResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SyncError::Config(format!("invalid realtime url '{endpoint}': {e}")))?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(SyncError::Config(format!(
                "realtime url must use ws or wss, got '{}'",
                endpoint.scheme()
            )));
        }
        Ok(Self { endpoint, client_identifier, connect_timeout: DEFAULT_CONNECT_TIMEOUT })
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Listener URL carrying the client id and URL-encoded access token.
    pub fn connect_url(&self, access_token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_identifier.to_string())
            .append_pair("access_token", access_token);
        url
    }
}

#[async_trait]
impl ChannelConnector for WebSocketConnector {
    #[instrument(skip(self, access_token), fields(host = self.endpoint.host_str().unwrap_or_default()))]
    async fn connect(&self, access_token: &str) -> SyncResult<Box<dyn PushChannel>> {
        let url = self.connect_url(access_token);

        let connected =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(url.as_str()))
                .await
                .map_err(|_| {
                    SyncError::TransientNetwork(format!(
                        "push channel connect timed out after {:?}",
                        self.connect_timeout
                    ))
                })?;
        let (socket, response) = connected.map_err(|e| SyncError::from(InfraError::from(e)))?;
        debug!(status = %response.status(), "push channel open");

        Ok(Box::new(WebSocketChannel::new(socket)))
    }
}

/// One open WebSocket, split into its write and read halves.
pub struct WebSocketChannel {
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
}

impl WebSocketChannel {
    fn new(socket: Socket) -> Self {
        let (sink, stream) = socket.split();
        Self { sink, stream }
    }
}

#[async_trait]
impl PushChannel for WebSocketChannel {
    async fn send_text(&mut self, text: &str) -> SyncResult<()> {
        self.sink
            .send(Message::Text(text.to_owned().into()))
            .await
            .map_err(|e| SyncError::from(InfraError::from(e)))
    }

    async fn recv(&mut self) -> SyncResult<ChannelFrame> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(ChannelFrame::Text(text.as_str().to_owned())),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|frame| u16::from(frame.code));
                    return Ok(ChannelFrame::Closed { code });
                }
                Some(Ok(_)) => {
                    // Pings are answered by tungstenite on the next write.
                    trace!("ignoring non-text frame");
                }
                Some(Err(e)) => return Err(InfraError::from(e).into()),
                None => return Ok(ChannelFrame::Closed { code: None }),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            debug!(error = %e, "push channel close handshake failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_url_encodes_token_and_client_id() {
        let connector = WebSocketConnector::new(
            "wss://www.anylist.com/data/add-user-listener",
            Uuid::nil(),
        )
        .unwrap();

        let url = connector.connect_url("a+b/c=");

        assert_eq!(
            url.as_str(),
            "wss://www.anylist.com/data/add-user-listener?client_id=00000000-0000-0000-0000-000000000000&access_token=a%2Bb%2Fc%3D"
        );
    }

    #[test]
    fn rejects_non_websocket_schemes() {
        let err = WebSocketConnector::new("https://example.com/listen", Uuid::nil()).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));

        assert!(WebSocketConnector::new("not a url", Uuid::nil()).is_err());
    }
}
