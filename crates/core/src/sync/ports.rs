//! Port interfaces for sync operations

use async_trait::async_trait;
use listsync_domain::{
    OperationId, PendingOperation, ShareListRequest, ShareListResponse, SyncResult,
};

/// Whether the transport may resend a request after a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Resent once with fresh headers when the first send is rejected as
    /// unauthorized. Batches are safe to resend: acknowledgements are keyed
    /// by operation id.
    #[default]
    Standard,
    /// Sent exactly once. A 401 still refreshes the token but the request
    /// is not repeated; every error goes straight back to the caller.
    SingleAttempt,
}

/// An authorized POST against the hosted API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Path relative to the API base URL.
    pub endpoint: &'static str,
    /// Content-Type header value, taken from the codec.
    pub content_type: &'static str,
    /// Encoded body.
    pub body: Vec<u8>,
    /// Whether a 401 may be answered with a resend.
    pub delivery: DeliveryPolicy,
}

impl ApiRequest {
    /// Request with [`DeliveryPolicy::Standard`].
    pub const fn new(endpoint: &'static str, content_type: &'static str, body: Vec<u8>) -> Self {
        Self { endpoint, content_type, body, delivery: DeliveryPolicy::Standard }
    }

    /// Mark the request as never resent.
    #[must_use]
    pub const fn single_attempt(mut self) -> Self {
        self.delivery = DeliveryPolicy::SingleAttempt;
        self
    }
}

/// Sends authorized requests and returns the raw response body.
///
/// Implementations attach the credential headers, pass through the shared
/// concurrency limiter and map HTTP failures onto
/// [`SyncError`](listsync_domain::SyncError).
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// POST `request` and return the body of a successful response.
    async fn post(&self, request: ApiRequest) -> SyncResult<Vec<u8>>;
}

/// Wire encoding for batches and share calls. Opaque to the queue.
pub trait OperationCodec: Send + Sync {
    /// Content-Type header value for encoded bodies.
    fn content_type(&self) -> &'static str;

    /// Encode a batch, preserving order.
    fn encode_batch(&self, batch: &[PendingOperation]) -> SyncResult<Vec<u8>>;

    /// Identifiers the server reports as processed.
    fn decode_acknowledgements(&self, body: &[u8]) -> SyncResult<Vec<OperationId>>;

    /// Encode a share-list call.
    fn encode_share(&self, request: &ShareListRequest) -> SyncResult<Vec<u8>>;

    fn decode_share_response(&self, body: &[u8]) -> SyncResult<ShareListResponse>;
}
