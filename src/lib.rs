//! # Shopping List
//!
//! Turns a free-text meal description into a categorized shopping list.
//!
//! The crate is built around one total function,
//! [`parse_shopping_list`](output_parser::parse_shopping_list), which reads
//! whatever a language model replied and returns ordered
//! `{ category, items }` records without ever failing. Around it sit the
//! collaborators a complete application needs:
//!
//! - **[`Backend`](backend::Backend)**: the completion provider
//!   ([`OpenAiBackend`], or [`MockBackend`] in tests), wrapped in transport
//!   retry with [`BackoffConfig`].
//! - **[`ExecCtx`]**: the explicitly owned client handle. Callers build one
//!   and pass it to every generation call.
//! - **[`ShoppingListGenerator`]**: prompt → completion → parsed list.
//! - **[`RecipeStore`]** / **[`RecipeService`]**: per-user persistence with
//!   identity and ownership checks.
//!
//! ## Parsing only
//!
//! ```
//! use shopping_list::output_parser::parse_shopping_list;
//!
//! let list = parse_shopping_list("Produce:\n- Tomatoes\n- Onions\nDairy:\n- Milk");
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.categories()[0].items, vec!["Tomatoes", "Onions"]);
//! ```
//!
//! ## Full flow
//!
//! ```no_run
//! use shopping_list::{ExecCtx, GeneratorConfig, InMemoryStore, RecipeService, ShoppingListGenerator, UserId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeneratorConfig::from_env();
//!     let ctx = ExecCtx::from_config(&config)?;
//!     let service = RecipeService::new(
//!         ShoppingListGenerator::from_config(&config),
//!         Arc::new(InMemoryStore::new()),
//!     );
//!
//!     let user = UserId::new("user_123");
//!     let id = service.generate_shopping_list(&ctx, Some(&user), "Spaghetti carbonara").await?;
//!     let recipe = service.recipe_by_id(Some(&user), id).await?;
//!     println!("{}", serde_json::to_string_pretty(&recipe.shopping_list)?);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod generator;
pub mod output_parser;
pub mod prompt;
pub mod service;
pub mod store;
pub mod types;

pub use backend::{BackoffConfig, MockBackend, OpenAiBackend};
pub use config::{GeneratorConfig, LlmConfig};
pub use diagnostics::{ParseDiagnostics, ParseOutcome};
pub use error::{Result, ShoppingListError};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use generator::{GeneratedList, ShoppingListGenerator};
pub use output_parser::{parse_shopping_list, parse_shopping_list_with_diagnostics};
pub use service::RecipeService;
pub use store::{InMemoryStore, RecipeStore};
pub use types::{NewRecipe, Recipe, RecipeId, ShoppingList, ShoppingListCategory, UserId};
