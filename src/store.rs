//! Recipe persistence.
//!
//! [`RecipeStore`] is the seam to whatever document store the application
//! uses. [`InMemoryStore`] backs tests and the CLI.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{NewRecipe, Recipe, RecipeId, UserId};

/// Storage for generated recipes, keyed by record id and owner.
///
/// Implementations validate incoming shopping lists with
/// [`ShoppingList::validate`](crate::types::ShoppingList::validate) and
/// return [`InvalidRecord`](crate::ShoppingListError::InvalidRecord) for
/// records that break the non-empty invariants.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Store a new recipe and return its id.
    async fn insert(&self, recipe: NewRecipe) -> Result<RecipeId>;

    /// All recipes owned by `user`, newest first.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Recipe>>;

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>>;

    /// Remove a recipe. Returns `false` if it did not exist.
    async fn delete(&self, id: RecipeId) -> Result<bool>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Process-local store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    recipes: RwLock<BTreeMap<RecipeId, Recipe>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.recipes.read().await.is_empty()
    }
}

#[async_trait]
impl RecipeStore for InMemoryStore {
    async fn insert(&self, recipe: NewRecipe) -> Result<RecipeId> {
        recipe.shopping_list.validate()?;

        let id = RecipeId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.recipes
            .write()
            .await
            .insert(id, Recipe::from_new(id, recipe));
        Ok(id)
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Recipe>> {
        let recipes = self.recipes.read().await;
        let mut owned: Vec<Recipe> = recipes
            .values()
            .filter(|r| r.is_owned_by(user))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn get(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.recipes.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: RecipeId) -> Result<bool> {
        Ok(self.recipes.write().await.remove(&id).is_some())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ShoppingList, ShoppingListCategory};
    use crate::ShoppingListError;

    fn new_recipe(user: &str, created_at: u64) -> NewRecipe {
        NewRecipe {
            user_id: UserId::new(user),
            description: format!("dinner at {}", created_at),
            shopping_list: ShoppingList::from(vec![ShoppingListCategory::new(
                "Produce",
                vec!["Leeks".to_string()],
            )
            .unwrap()]),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryStore::new();
        let id = store.insert(new_recipe("alice", 10)).await.unwrap();
        assert_eq!(id, RecipeId::new(1));

        let recipe = store.get(id).await.unwrap().expect("stored");
        assert_eq!(recipe.user_id, UserId::new("alice"));
        assert_eq!(recipe.shopping_list.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_per_user_and_newest_first() {
        let store = InMemoryStore::new();
        store.insert(new_recipe("alice", 10)).await.unwrap();
        store.insert(new_recipe("bob", 20)).await.unwrap();
        store.insert(new_recipe("alice", 30)).await.unwrap();
        store.insert(new_recipe("alice", 30)).await.unwrap();

        let recipes = store.list_for_user(&UserId::new("alice")).await.unwrap();
        let order: Vec<(u64, u64)> = recipes.iter().map(|r| (r.created_at, r.id.get())).collect();
        assert_eq!(order, vec![(30, 4), (30, 3), (10, 1)]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        let id = store.insert(new_recipe("alice", 10)).await.unwrap();
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_list() {
        let store = InMemoryStore::new();
        let mut recipe = new_recipe("alice", 10);
        recipe.shopping_list = ShoppingList::from(vec![ShoppingListCategory {
            category: "Dairy".into(),
            items: vec![],
        }]);
        let result = store.insert(recipe).await;
        assert!(matches!(result, Err(ShoppingListError::InvalidRecord(_))));
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = InMemoryStore::new();
        let first = tokio_test::block_on(store.insert(new_recipe("alice", 1))).unwrap();
        tokio_test::block_on(store.delete(first)).unwrap();
        let second = tokio_test::block_on(store.insert(new_recipe("alice", 2))).unwrap();
        assert!(second > first);
    }
}
