//! Shopping list, item and store mutations

use std::sync::Arc;

use listsync_domain::constants::ENDPOINT_SHARE_LIST;
use listsync_domain::{
    ItemChanges, ListItemDraft, OperationId, OperationPayload, ShareListRequest,
    ShareListResponse, SyncError, SyncResult,
};
use tracing::{debug, instrument, warn};

use super::new_entity_id;
use crate::sync::{ApiRequest, ApiTransport, OperationCodec, OperationQueue};

/// Builds shopping list operations for the lists queue.
///
/// Also owns the immediate share-list call, which skips the queue.
pub struct ShoppingListManager {
    queue: Arc<OperationQueue>,
    transport: Arc<dyn ApiTransport>,
    codec: Arc<dyn OperationCodec>,
}

impl ShoppingListManager {
    /// `queue` must be the shopping-lists queue; `transport` and `codec`
    /// serve the direct share call.
    pub fn new(
        queue: Arc<OperationQueue>,
        transport: Arc<dyn ApiTransport>,
        codec: Arc<dyn OperationCodec>,
    ) -> Self {
        Self { queue, transport, codec }
    }

    pub const fn queue(&self) -> &Arc<OperationQueue> {
        &self.queue
    }

    /// Create a list; returns its new identifier.
    pub fn create_list(&self, name: impl Into<String>) -> String {
        let list_id = new_entity_id();
        self.queue.add_operation(OperationPayload::NewShoppingList {
            list_id: list_id.clone(),
            name: name.into(),
        });
        list_id
    }

    pub fn rename_list(&self, list_id: &str, name: impl Into<String>) -> OperationId {
        self.queue
            .add_operation(OperationPayload::RenameList { list_id: list_id.into(), name: name.into() })
    }

    pub fn delete_list(&self, list_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::DeleteList { list_id: list_id.into() })
    }

    /// Add an item by name; returns the new item identifier.
    pub fn add_item(&self, list_id: &str, name: impl Into<String>) -> String {
        let item = ListItemDraft {
            item_id: new_entity_id(),
            name: name.into(),
            quantity: None,
            details: None,
            category: None,
        };
        let item_id = item.item_id.clone();
        self.add_item_draft(list_id, item);
        item_id
    }

    /// Add a fully specified item.
    pub fn add_item_draft(&self, list_id: &str, item: ListItemDraft) -> OperationId {
        self.queue
            .add_operation(OperationPayload::AddShoppingListItem { list_id: list_id.into(), item })
    }

    /// Queue an item edit. Returns `None` without queueing when `changes`
    /// is empty.
    pub fn update_item(
        &self,
        list_id: &str,
        item_id: &str,
        changes: ItemChanges,
    ) -> Option<OperationId> {
        if changes.is_empty() {
            debug!(list_id, item_id, "no item changes to queue");
            return None;
        }
        Some(self.queue.add_operation(OperationPayload::UpdateListItem {
            list_id: list_id.into(),
            item_id: item_id.into(),
            changes,
        }))
    }

    /// Tick or untick an item.
    pub fn set_item_checked(&self, list_id: &str, item_id: &str, checked: bool) -> OperationId {
        self.queue.add_operation(OperationPayload::SetListItemChecked {
            list_id: list_id.into(),
            item_id: item_id.into(),
            checked,
        })
    }

    pub fn remove_item(&self, list_id: &str, item_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::RemoveShoppingListItem {
            list_id: list_id.into(),
            item_id: item_id.into(),
        })
    }

    /// Create a store on a list; returns the store identifier.
    pub fn create_store(&self, list_id: &str, name: impl Into<String>) -> String {
        let store_id = new_entity_id();
        self.queue.add_operation(OperationPayload::NewStore {
            list_id: list_id.into(),
            store_id: store_id.clone(),
            name: name.into(),
        });
        store_id
    }

    pub fn rename_store(&self, list_id: &str, store_id: &str, name: impl Into<String>) -> OperationId {
        self.queue.add_operation(OperationPayload::SetStoreName {
            list_id: list_id.into(),
            store_id: store_id.into(),
            name: name.into(),
        })
    }

    /// Items assigned to the store keep their other fields.
    pub fn delete_store(&self, list_id: &str, store_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::DeleteStore {
            list_id: list_id.into(),
            store_id: store_id.into(),
        })
    }

    /// Create or replace a store filter. Pass `None` to create a new one;
    /// returns the filter identifier either way.
    pub fn save_store_filter(
        &self,
        list_id: &str,
        filter_id: Option<&str>,
        name: impl Into<String>,
        store_ids: Vec<String>,
    ) -> String {
        let filter_id = filter_id.map_or_else(new_entity_id, str::to_string);
        self.queue.add_operation(OperationPayload::UpdateStoreFilter {
            list_id: list_id.into(),
            filter_id: filter_id.clone(),
            name: name.into(),
            store_ids,
        });
        filter_id
    }

    pub fn delete_store_filter(&self, list_id: &str, filter_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::DeleteStoreFilter {
            list_id: list_id.into(),
            filter_id: filter_id.into(),
        })
    }

    /// Share a list with another account.
    ///
    /// Sent immediately with a single attempt. Transport errors and a
    /// non-zero server status are returned to the caller, never retried.
    #[instrument(skip(self, email), fields(list_id = %list_id))]
    pub async fn share_list(&self, list_id: &str, email: &str) -> SyncResult<ShareListResponse> {
        let request = ShareListRequest { list_id: list_id.into(), email: email.into() };
        let body = self.codec.encode_share(&request)?;
        let request =
            ApiRequest::new(ENDPOINT_SHARE_LIST, self.codec.content_type(), body).single_attempt();

        let raw = self.transport.post(request).await?;
        let response = self.codec.decode_share_response(&raw)?;
        if !response.is_success() {
            warn!(status_code = response.status_code, "share-list rejected");
            let reason = response
                .error_message
                .clone()
                .or_else(|| response.error_title.clone())
                .unwrap_or_else(|| format!("status {}", response.status_code));
            return Err(SyncError::OperationRejected(format!("share-list: {reason}")));
        }

        debug!("list shared");
        Ok(response)
    }
}
