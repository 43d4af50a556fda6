//! Shared test helpers for `listsync-core` integration tests.
//!
//! Hand-written port mocks that record what the engine does so tests can
//! assert on call counts, bodies and timing under a paused clock.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use listsync_core::{
    ApiRequest, ApiTransport, ChannelConnector, ChannelFrame, OperationCodec, PushChannel,
    PushSignalHandler, TokenAuthority, TokenRefresher,
};
use listsync_domain::{
    ConnectionState, Credential, OperationId, PendingOperation, ShareListRequest,
    ShareListResponse, SyncError, SyncEvent, SyncResult,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

/* -------------------------------------------------------------------------- */
/* Auth                                                                       */
/* -------------------------------------------------------------------------- */

/// Hands out `fresh-access-N` / `fresh-refresh-N` and counts calls.
#[derive(Default)]
pub struct CountingRefresher {
    pub calls: AtomicUsize,
}

impl CountingRefresher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, _refresh_token: &str) -> SyncResult<Credential> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        Ok(Credential::new(format!("fresh-access-{n}"), format!("fresh-refresh-{n}")))
    }
}

pub fn authority(access_token: &str, refresher: Arc<CountingRefresher>) -> Arc<TokenAuthority> {
    Arc::new(TokenAuthority::new(
        Credential::new(access_token, "refresh-token"),
        Uuid::nil(),
        refresher,
    ))
}

/* -------------------------------------------------------------------------- */
/* Sync                                                                       */
/* -------------------------------------------------------------------------- */

/// Newline-separated operation ids in both directions.
pub struct IdListCodec;

impl IdListCodec {
    pub fn ids(body: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(body).lines().map(str::to_string).collect()
    }

    pub fn ack(ids: &[&OperationId]) -> Vec<u8> {
        ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join("\n").into_bytes()
    }
}

impl OperationCodec for IdListCodec {
    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn encode_batch(&self, batch: &[PendingOperation]) -> SyncResult<Vec<u8>> {
        Ok(IdListCodec::ack(&batch.iter().map(PendingOperation::id).collect::<Vec<_>>()))
    }

    fn decode_acknowledgements(&self, body: &[u8]) -> SyncResult<Vec<OperationId>> {
        Ok(IdListCodec::ids(body).into_iter().filter(|l| !l.is_empty()).map(OperationId::from).collect())
    }

    fn encode_share(&self, request: &ShareListRequest) -> SyncResult<Vec<u8>> {
        Ok(request.list_id.clone().into_bytes())
    }

    fn decode_share_response(&self, _body: &[u8]) -> SyncResult<ShareListResponse> {
        Ok(ShareListResponse {
            status_code: 0,
            shared_user: None,
            error_title: None,
            error_message: None,
        })
    }
}

/// One recorded outbound request.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub at: Instant,
    pub endpoint: &'static str,
    pub bearer: String,
    pub ids: Vec<String>,
}

type Responder = Box<dyn Fn(&[String]) -> SyncResult<Vec<u8>> + Send + Sync>;

/// Transport that authorizes through a [`TokenAuthority`] the way the HTTP
/// adapter does: a request carrying `stale-token` gets a 401, triggers one
/// refresh and is retried once with the new headers.
pub struct AuthorizingTransport {
    authority: Arc<TokenAuthority>,
    responder: Responder,
    scripted: Mutex<VecDeque<SyncResult<Vec<u8>>>>,
    pub sent: Mutex<Vec<SentRequest>>,
}

impl AuthorizingTransport {
    /// Acknowledges every operation in every batch.
    pub fn acking_all(authority: Arc<TokenAuthority>) -> Arc<Self> {
        Self::with_responder(authority, |ids| {
            Ok(ids.join("\n").into_bytes())
        })
    }

    pub fn with_responder(
        authority: Arc<TokenAuthority>,
        responder: impl Fn(&[String]) -> SyncResult<Vec<u8>> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            authority,
            responder: Box::new(responder),
            scripted: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Answer the next request with `response` instead of the responder.
    pub fn script(&self, response: SyncResult<Vec<u8>>) {
        self.scripted.lock().push_back(response);
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    fn attempt(&self, request: &ApiRequest) -> SyncResult<Vec<u8>> {
        let bearer = self.authority.authorized_headers().bearer_token;
        let ids = IdListCodec::ids(&request.body);
        self.sent.lock().push(SentRequest {
            at: Instant::now(),
            endpoint: request.endpoint,
            bearer: bearer.clone(),
            ids: ids.clone(),
        });

        if bearer == "stale-token" {
            return Err(SyncError::AuthExpired("401".into()));
        }
        if let Some(response) = self.scripted.lock().pop_front() {
            return response;
        }
        (self.responder)(&ids)
    }
}

#[async_trait]
impl ApiTransport for AuthorizingTransport {
    async fn post(&self, request: ApiRequest) -> SyncResult<Vec<u8>> {
        tokio::task::yield_now().await;
        match self.attempt(&request) {
            Err(SyncError::AuthExpired(_)) => {
                self.authority.refresh().await?;
                self.attempt(&request)
            }
            other => other,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Realtime                                                                   */
/* -------------------------------------------------------------------------- */

/// Client side of an in-memory push channel.
pub struct MockChannel {
    incoming: mpsc::UnboundedReceiver<ChannelFrame>,
    outgoing: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl PushChannel for MockChannel {
    async fn send_text(&mut self, text: &str) -> SyncResult<()> {
        self.outgoing
            .send(text.to_string())
            .map_err(|_| SyncError::ConnectionLost("server end dropped".into()))
    }

    async fn recv(&mut self) -> SyncResult<ChannelFrame> {
        Ok(self.incoming.recv().await.unwrap_or(ChannelFrame::Closed { code: None }))
    }

    async fn close(&mut self) {
        self.incoming.close();
    }
}

/// Server side of an in-memory push channel.
pub struct ServerEnd {
    to_client: mpsc::UnboundedSender<ChannelFrame>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    pub fn send_text(&self, text: &str) {
        let _ = self.to_client.send(ChannelFrame::Text(text.to_string()));
    }

    pub fn close_with(&self, code: u16) {
        let _ = self.to_client.send(ChannelFrame::Closed { code: Some(code) });
    }

    /// Frames the client sent so far.
    pub fn drain_received(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the client has dropped or closed its end.
    pub fn is_closed_by_client(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// One connect attempt.
#[derive(Debug, Clone)]
pub struct ConnectAttempt {
    pub at: Instant,
    pub access_token: String,
}

/// Connector that replays a script of outcomes and refuses once the script
/// runs out.
#[derive(Default)]
pub struct ScriptedConnector {
    script: Mutex<VecDeque<SyncResult<MockChannel>>>,
    attempts: Mutex<Vec<ConnectAttempt>>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Next attempt succeeds; returns the server side of the channel.
    pub fn accept(&self) -> ServerEnd {
        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        self.script.lock().push_back(Ok(MockChannel { incoming, outgoing }));
        ServerEnd { to_client, from_client }
    }

    /// Next attempt fails with `error`.
    pub fn refuse(&self, error: SyncError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn attempts(&self) -> Vec<ConnectAttempt> {
        self.attempts.lock().clone()
    }

    /// Milliseconds between consecutive attempts.
    pub fn gaps_ms(&self) -> Vec<u128> {
        self.attempts().windows(2).map(|w| (w[1].at - w[0].at).as_millis()).collect()
    }
}

#[async_trait]
impl ChannelConnector for ScriptedConnector {
    async fn connect(&self, access_token: &str) -> SyncResult<Box<dyn PushChannel>> {
        self.attempts
            .lock()
            .push(ConnectAttempt { at: Instant::now(), access_token: access_token.to_string() });
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(channel)) => Ok(Box::new(channel)),
            Some(Err(error)) => Err(error),
            None => Err(SyncError::TransientNetwork("connection refused".into())),
        }
    }
}

/// Records every signal and state transition.
#[derive(Default)]
pub struct RecordingHandler {
    pub signals: Mutex<Vec<SyncEvent>>,
    pub states: Mutex<Vec<ConnectionState>>,
}

impl PushSignalHandler for RecordingHandler {
    fn on_signal(&self, event: SyncEvent) {
        self.signals.lock().push(event);
    }

    fn on_state_change(&self, state: ConnectionState) {
        self.states.lock().push(state);
    }
}
