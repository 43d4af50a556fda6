//! Domain managers
//!
//! Thin builders: one method per mutation kind, each producing a typed
//! [`OperationPayload`](listsync_domain::OperationPayload) and handing it to
//! the owning queue. The only network call made directly is list sharing.

pub mod category;
pub mod meal_plan;
pub mod recipe;
pub mod shopping_list;

pub use category::CategoryManager;
pub use meal_plan::MealPlanManager;
pub use recipe::RecipeManager;
pub use shopping_list::ShoppingListManager;

use uuid::Uuid;

/// Client-side identifier for a new entity.
pub(crate) fn new_entity_id() -> String {
    Uuid::new_v4().simple().to_string()
}
