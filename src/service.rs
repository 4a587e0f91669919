//! Authenticated shopping-list operations.
//!
//! [`RecipeService`] combines the generator with a [`RecipeStore`] and
//! enforces identity and ownership. The identity itself is resolved by the
//! caller; `None` means the caller is not signed in.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, ShoppingListError};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::generator::ShoppingListGenerator;
use crate::store::RecipeStore;
use crate::types::{NewRecipe, Recipe, RecipeId, UserId};

pub struct RecipeService {
    generator: ShoppingListGenerator,
    store: Arc<dyn RecipeStore>,
}

impl std::fmt::Debug for RecipeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeService")
            .field("generator", &self.generator)
            .field("store", &self.store.name())
            .finish()
    }
}

fn require_identity(identity: Option<&UserId>) -> Result<&UserId> {
    identity.ok_or(ShoppingListError::Unauthorized)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl RecipeService {
    pub fn new(generator: ShoppingListGenerator, store: Arc<dyn RecipeStore>) -> Self {
        Self { generator, store }
    }

    pub fn generator(&self) -> &ShoppingListGenerator {
        &self.generator
    }

    /// Generate a shopping list for `description` and store it for the caller.
    pub async fn generate_shopping_list(
        &self,
        ctx: &ExecCtx,
        identity: Option<&UserId>,
        description: &str,
    ) -> Result<RecipeId> {
        let user = require_identity(identity)?;
        let generated = self.generator.generate(ctx, description).await?;

        let id = self
            .store
            .insert(NewRecipe {
                user_id: user.clone(),
                description: description.to_string(),
                shopping_list: generated.shopping_list,
                created_at: now_millis(),
            })
            .await?;

        log::info!("Stored recipe {} for {} in {} store", id, user, self.store.name());
        emit(&ctx.event_handler, Event::Stored { recipe_id: id });
        Ok(id)
    }

    /// The caller's recipes, newest first.
    pub async fn user_recipes(&self, identity: Option<&UserId>) -> Result<Vec<Recipe>> {
        let user = require_identity(identity)?;
        self.store.list_for_user(user).await
    }

    /// One of the caller's recipes. Someone else's recipe is reported as not found.
    pub async fn recipe_by_id(&self, identity: Option<&UserId>, id: RecipeId) -> Result<Recipe> {
        let user = require_identity(identity)?;
        match self.store.get(id).await? {
            Some(recipe) if recipe.is_owned_by(user) => Ok(recipe),
            _ => Err(ShoppingListError::NotFound(id)),
        }
    }

    /// Delete one of the caller's recipes.
    pub async fn delete_recipe(&self, identity: Option<&UserId>, id: RecipeId) -> Result<()> {
        // Ownership check first; the error is the same whether the record is
        // missing or foreign.
        self.recipe_by_id(identity, id).await?;
        if !self.store.delete(id).await? {
            return Err(ShoppingListError::NotFound(id));
        }
        log::info!("Deleted recipe {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::store::InMemoryStore;

    fn setup(reply: &str) -> (RecipeService, ExecCtx) {
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::fixed(reply)))
            .build()
            .unwrap();
        let service = RecipeService::new(ShoppingListGenerator::new(), Arc::new(InMemoryStore::new()));
        (service, ctx)
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_are_rejected() {
        let (service, ctx) = setup("Dairy:\n- Milk");
        assert!(matches!(
            service.generate_shopping_list(&ctx, None, "pudding").await,
            Err(ShoppingListError::Unauthorized)
        ));
        assert!(matches!(service.user_recipes(None).await, Err(ShoppingListError::Unauthorized)));
        assert!(matches!(
            service.recipe_by_id(None, RecipeId::new(1)).await,
            Err(ShoppingListError::Unauthorized)
        ));
        assert!(matches!(
            service.delete_recipe(None, RecipeId::new(1)).await,
            Err(ShoppingListError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_generate_and_fetch() {
        let (service, ctx) = setup("Dairy:\n- Milk\n- Eggs");
        let alice = UserId::new("alice");

        let id = service
            .generate_shopping_list(&ctx, Some(&alice), "custard")
            .await
            .unwrap();
        let recipe = service.recipe_by_id(Some(&alice), id).await.unwrap();

        assert_eq!(recipe.description, "custard");
        assert_eq!(recipe.shopping_list.categories()[0].items, vec!["Milk", "Eggs"]);
        assert!(recipe.created_at > 0);
    }

    #[tokio::test]
    async fn test_foreign_recipe_is_not_found() {
        let (service, ctx) = setup("Dairy:\n- Milk");
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let id = service
            .generate_shopping_list(&ctx, Some(&alice), "latte")
            .await
            .unwrap();

        assert!(matches!(
            service.recipe_by_id(Some(&bob), id).await,
            Err(ShoppingListError::NotFound(found)) if found == id
        ));
        assert!(matches!(
            service.delete_recipe(Some(&bob), id).await,
            Err(ShoppingListError::NotFound(_))
        ));
        assert!(service.user_recipes(Some(&bob)).await.unwrap().is_empty());

        service.delete_recipe(Some(&alice), id).await.unwrap();
        assert!(service.user_recipes(Some(&alice)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_stores_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::fixed("")))
            .build()
            .unwrap();
        let service = RecipeService::new(ShoppingListGenerator::new(), store.clone());

        let result = service
            .generate_shopping_list(&ctx, Some(&UserId::new("alice")), "toast")
            .await;
        assert!(matches!(result, Err(ShoppingListError::EmptyResponse)));
        assert!(store.is_empty().await);
    }
}
