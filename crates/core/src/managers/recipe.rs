//! Recipe and recipe collection mutations

use std::sync::Arc;

use listsync_domain::{Ingredient, OperationId, OperationPayload, RecipeDraft};

use super::new_entity_id;
use crate::sync::OperationQueue;

/// Builds operations for the recipes queue.
pub struct RecipeManager {
    queue: Arc<OperationQueue>,
}

impl RecipeManager {
    pub const fn new(queue: Arc<OperationQueue>) -> Self {
        Self { queue }
    }

    /// Create a recipe; returns its identifier.
    pub fn create_recipe(
        &self,
        name: impl Into<String>,
        ingredients: Vec<Ingredient>,
        preparation_steps: Vec<String>,
    ) -> String {
        let recipe = RecipeDraft {
            recipe_id: new_entity_id(),
            name: name.into(),
            ingredients,
            preparation_steps,
        };
        let recipe_id = recipe.recipe_id.clone();
        self.queue.add_operation(OperationPayload::NewRecipe { recipe });
        recipe_id
    }

    /// Remove one or more recipes in a single operation.
    pub fn delete_recipes(&self, recipe_ids: Vec<String>) -> OperationId {
        self.queue.add_operation(OperationPayload::RemoveRecipe { recipe_ids })
    }

    /// Create an empty collection; returns its identifier.
    pub fn create_collection(&self, name: impl Into<String>) -> String {
        let collection_id = new_entity_id();
        self.queue.add_operation(OperationPayload::NewRecipeCollection {
            collection_id: collection_id.clone(),
            name: name.into(),
        });
        collection_id
    }

    pub fn delete_collection(&self, collection_id: &str) -> OperationId {
        self.queue.add_operation(OperationPayload::RemoveRecipeCollection {
            collection_id: collection_id.into(),
        })
    }

    /// Recipes already in the collection are left alone by the server.
    pub fn add_to_collection(&self, collection_id: &str, recipe_ids: Vec<String>) -> OperationId {
        self.queue.add_operation(OperationPayload::AddRecipesToCollection {
            collection_id: collection_id.into(),
            recipe_ids,
        })
    }

    pub fn remove_from_collection(
        &self,
        collection_id: &str,
        recipe_ids: Vec<String>,
    ) -> OperationId {
        self.queue.add_operation(OperationPayload::RemoveRecipesFromCollection {
            collection_id: collection_id.into(),
            recipe_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use listsync_domain::SyncDomain;

    use super::*;
    use crate::managers::test_support::{payloads, queue};

    #[test]
    fn collection_round_trip_is_queued() {
        let queue = queue(SyncDomain::Recipes);
        let manager = RecipeManager::new(Arc::clone(&queue));

        let recipe_id = manager.create_recipe(
            "Pancakes",
            vec![Ingredient { name: "Flour".into(), quantity: Some("200 g".into()), note: None }],
            vec!["Whisk".into(), "Fry".into()],
        );
        let collection_id = manager.create_collection("Breakfast");
        manager.add_to_collection(&collection_id, vec![recipe_id.clone()]);

        let pending = payloads(&queue);
        assert_eq!(pending.len(), 3);
        assert!(matches!(&pending[0], OperationPayload::NewRecipe { recipe } if recipe.recipe_id == recipe_id));
        assert_eq!(
            pending[2],
            OperationPayload::AddRecipesToCollection { collection_id, recipe_ids: vec![recipe_id] }
        );
    }
}
