//! Typed operation payloads
//!
//! One variant per server handler. Each variant carries only the fields its
//! handler needs; the serde tag is the handler identifier the server routes
//! on. Queues treat payloads as opaque and never look inside.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::operation::{OperationClass, SyncDomain};

/// New shopping list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItemDraft {
    pub item_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Fields to change on an existing item; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ItemChanges {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.details.is_none()
            && self.category.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub recipe_id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub preparation_steps: Vec<String>,
}

/// Meal-plan calendar entry. Either a recipe or a free-text title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub event_id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
}

/// Mutation payload keyed by handler identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "handler_id", content = "params")]
pub enum OperationPayload {
    // Shopping lists
    #[serde(rename = "new-shopping-list")]
    NewShoppingList { list_id: String, name: String },
    #[serde(rename = "rename-list")]
    RenameList { list_id: String, name: String },
    #[serde(rename = "delete-list")]
    DeleteList { list_id: String },
    #[serde(rename = "add-shopping-list-item")]
    AddShoppingListItem { list_id: String, item: ListItemDraft },
    #[serde(rename = "update-list-item")]
    UpdateListItem { list_id: String, item_id: String, changes: ItemChanges },
    #[serde(rename = "set-list-item-checked")]
    SetListItemChecked { list_id: String, item_id: String, checked: bool },
    #[serde(rename = "remove-shopping-list-item")]
    RemoveShoppingListItem { list_id: String, item_id: String },

    // Stores and store filters
    #[serde(rename = "new-store")]
    NewStore { list_id: String, store_id: String, name: String },
    #[serde(rename = "set-store-name")]
    SetStoreName { list_id: String, store_id: String, name: String },
    #[serde(rename = "delete-store")]
    DeleteStore { list_id: String, store_id: String },
    #[serde(rename = "update-store-filter")]
    UpdateStoreFilter { list_id: String, filter_id: String, name: String, store_ids: Vec<String> },
    #[serde(rename = "delete-store-filter")]
    DeleteStoreFilter { list_id: String, filter_id: String },

    // Categories
    #[serde(rename = "create-category")]
    CreateCategory { list_id: String, category_group_id: String, category_id: String, name: String },
    #[serde(rename = "update-category-name")]
    UpdateCategoryName { list_id: String, category_id: String, name: String },
    #[serde(rename = "delete-category")]
    DeleteCategory { list_id: String, category_id: String },

    // Recipes
    #[serde(rename = "new-recipe")]
    NewRecipe { recipe: RecipeDraft },
    #[serde(rename = "remove-recipe")]
    RemoveRecipe { recipe_ids: Vec<String> },
    #[serde(rename = "new-recipe-collection")]
    NewRecipeCollection { collection_id: String, name: String },
    #[serde(rename = "remove-recipe-collection")]
    RemoveRecipeCollection { collection_id: String },
    #[serde(rename = "add-recipes-to-collection")]
    AddRecipesToCollection { collection_id: String, recipe_ids: Vec<String> },
    #[serde(rename = "remove-recipes-from-collection")]
    RemoveRecipesFromCollection { collection_id: String, recipe_ids: Vec<String> },

    // Meal planning
    #[serde(rename = "new-event")]
    NewEvent { calendar_id: String, event: EventDraft },
    #[serde(rename = "update-event")]
    UpdateEvent { calendar_id: String, event: EventDraft },
    #[serde(rename = "delete-event")]
    DeleteEvent { calendar_id: String, event_ids: Vec<String> },
}

impl OperationPayload {
    /// Server handler identifier for this payload.
    pub const fn handler_id(&self) -> &'static str {
        match self {
            Self::NewShoppingList { .. } => "new-shopping-list",
            Self::RenameList { .. } => "rename-list",
            Self::DeleteList { .. } => "delete-list",
            Self::AddShoppingListItem { .. } => "add-shopping-list-item",
            Self::UpdateListItem { .. } => "update-list-item",
            Self::SetListItemChecked { .. } => "set-list-item-checked",
            Self::RemoveShoppingListItem { .. } => "remove-shopping-list-item",
            Self::NewStore { .. } => "new-store",
            Self::SetStoreName { .. } => "set-store-name",
            Self::DeleteStore { .. } => "delete-store",
            Self::UpdateStoreFilter { .. } => "update-store-filter",
            Self::DeleteStoreFilter { .. } => "delete-store-filter",
            Self::CreateCategory { .. } => "create-category",
            Self::UpdateCategoryName { .. } => "update-category-name",
            Self::DeleteCategory { .. } => "delete-category",
            Self::NewRecipe { .. } => "new-recipe",
            Self::RemoveRecipe { .. } => "remove-recipe",
            Self::NewRecipeCollection { .. } => "new-recipe-collection",
            Self::RemoveRecipeCollection { .. } => "remove-recipe-collection",
            Self::AddRecipesToCollection { .. } => "add-recipes-to-collection",
            Self::RemoveRecipesFromCollection { .. } => "remove-recipes-from-collection",
            Self::NewEvent { .. } => "new-event",
            Self::UpdateEvent { .. } => "update-event",
            Self::DeleteEvent { .. } => "delete-event",
        }
    }

    /// Routing discriminator; only store and category handlers set one.
    pub const fn operation_class(&self) -> OperationClass {
        match self {
            Self::NewStore { .. } | Self::SetStoreName { .. } | Self::DeleteStore { .. } => {
                OperationClass::Store
            }
            Self::UpdateStoreFilter { .. } | Self::DeleteStoreFilter { .. } => {
                OperationClass::StoreFilter
            }
            Self::CreateCategory { .. }
            | Self::UpdateCategoryName { .. }
            | Self::DeleteCategory { .. } => OperationClass::ListCategory,
            _ => OperationClass::Undefined,
        }
    }

    /// Queue (and endpoint) this payload belongs to.
    pub const fn domain(&self) -> SyncDomain {
        match self {
            Self::NewRecipe { .. }
            | Self::RemoveRecipe { .. }
            | Self::NewRecipeCollection { .. }
            | Self::RemoveRecipeCollection { .. }
            | Self::AddRecipesToCollection { .. }
            | Self::RemoveRecipesFromCollection { .. } => SyncDomain::Recipes,
            Self::NewEvent { .. } | Self::UpdateEvent { .. } | Self::DeleteEvent { .. } => {
                SyncDomain::MealPlan
            }
            _ => SyncDomain::ShoppingLists,
        }
    }
}

/// Body of the immediate share-list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareListRequest {
    pub list_id: String,
    pub email: String,
}

/// Server verdict for a share-list call. Status 0 means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareListResponse {
    pub status_code: i32,
    /// Display name of the account the list was shared with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ShareListResponse {
    pub const fn is_success(&self) -> bool {
        self.status_code == 0
    }
}
