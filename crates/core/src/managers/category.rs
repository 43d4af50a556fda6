//! List category mutations

use std::sync::Arc;

use listsync_domain::{OperationId, OperationPayload};

use super::new_entity_id;
use crate::sync::OperationQueue;

/// Builds category operations.
///
/// Categories live on the shopping-lists endpoint, so this manager shares
/// the lists queue and its causal order with [`ShoppingListManager`](super::ShoppingListManager).
pub struct CategoryManager {
    queue: Arc<OperationQueue>,
}

impl CategoryManager {
    pub const fn new(queue: Arc<OperationQueue>) -> Self {
        Self { queue }
    }

    /// Create a category in a group; returns the category identifier.
    pub fn create_category(
        &self,
        list_id: &str,
        category_group_id: &str,
        name: impl Into<String>,
    ) -> String {
        let category_id = new_entity_id();
        self.queue.add_operation(OperationPayload::CreateCategory {
            list_id: list_id.into(),
            category_group_id: category_group_id.into(),
            category_id: category_id.clone(),
            name: name.into(),
        });
        category_id
    }

    pub fn rename_category(
        &self,
        list_id: &str,
        category_id: &str,
        name: impl Into<String>,
    ) -> OperationId {
        self.queue.add_operation(OperationPayload::UpdateCategoryName {
            list_id: list_id.into(),
            category_id: category_id.into(),
            name: name.into(),
        })
    }

    pub fn delete_category(&self, list_id: &str, category_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::DeleteCategory {
            list_id: list_id.into(),
            category_id: category_id.into(),
        })
    }
}
