//! Domain types and models

pub mod auth;
pub mod operation;
pub mod payload;
pub mod realtime;

pub use auth::{AuthHeaders, Credential};
pub use operation::{
    LogicalTimestamp, OperationClass, OperationId, OperationMetadata, PendingOperation, SyncDomain,
    UserId,
};
pub use payload::{
    EventDraft, Ingredient, ItemChanges, ListItemDraft, OperationPayload, RecipeDraft,
    ShareListRequest, ShareListResponse,
};
pub use realtime::{ConnectionState, SyncEvent};
