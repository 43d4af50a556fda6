//! JSON wire encoding for batches and share calls

use listsync_core::OperationCodec;
use listsync_domain::{
    OperationId, PendingOperation, ShareListRequest, ShareListResponse, SyncError, SyncResult,
};
use serde::{Deserialize, Serialize};

use crate::errors::InfraError;

/// Content type of every batch and share body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
struct BatchEnvelope<'a> {
    operations: &'a [PendingOperation],
}

#[derive(Deserialize)]
struct AcknowledgementEnvelope {
    #[serde(default)]
    processed_operations: Vec<OperationId>,
}

/// [`OperationCodec`] producing `{"operations": [..]}` batches and reading
/// `{"processed_operations": [..]}` acknowledgements.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOperationCodec;

impl JsonOperationCodec {
    pub const fn new() -> Self {
        Self
    }
}

fn json_error(err: serde_json::Error) -> SyncError {
    InfraError::from(err).into()
}

impl OperationCodec for JsonOperationCodec {
    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn encode_batch(&self, batch: &[PendingOperation]) -> SyncResult<Vec<u8>> {
        serde_json::to_vec(&BatchEnvelope { operations: batch }).map_err(json_error)
    }

    fn decode_acknowledgements(&self, body: &[u8]) -> SyncResult<Vec<OperationId>> {
        if body.is_empty() {
            return Err(SyncError::Codec("empty acknowledgement body".into()));
        }
        let envelope: AcknowledgementEnvelope = serde_json::from_slice(body).map_err(json_error)?;
        Ok(envelope.processed_operations)
    }

    fn encode_share(&self, request: &ShareListRequest) -> SyncResult<Vec<u8>> {
        serde_json::to_vec(request).map_err(json_error)
    }

    fn decode_share_response(&self, body: &[u8]) -> SyncResult<ShareListResponse> {
        serde_json::from_slice(body).map_err(json_error)
    }
}
