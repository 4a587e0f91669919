use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShoppingListError};

/// One heading of a shopping list and the items filed under it.
///
/// Both fields are non-empty for every record the parser emits. Records that
/// arrive from elsewhere (deserialized, hand-built) are checked with
/// [`validate`](Self::validate) before they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListCategory {
    /// Display label taken from the header line.
    pub category: String,

    /// Items in order of appearance.
    pub items: Vec<String>,
}

impl ShoppingListCategory {
    /// Build a category, refusing an empty label or an empty item list.
    pub fn new(category: impl Into<String>, items: Vec<String>) -> Option<Self> {
        let category = category.into();
        if category.is_empty() || items.is_empty() {
            return None;
        }
        Some(Self { category, items })
    }

    /// Check the non-empty invariants on a record of unknown origin.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(ShoppingListError::InvalidRecord(
                "category label is empty".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(ShoppingListError::InvalidRecord(format!(
                "category '{}' has no items",
                self.category
            )));
        }
        if self.items.iter().any(|item| item.trim().is_empty()) {
            return Err(ShoppingListError::InvalidRecord(format!(
                "category '{}' contains a blank item",
                self.category
            )));
        }
        Ok(())
    }
}

/// Ordered categories, in the order they were closed during the scan.
///
/// Serializes as a bare JSON array of `{ "category", "items" }` objects.
/// Categories with the same label are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShoppingList(Vec<ShoppingListCategory>);

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, category: ShoppingListCategory) {
        self.0.push(category);
    }

    pub fn categories(&self) -> &[ShoppingListCategory] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShoppingListCategory> {
        self.0.iter()
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.0.iter().map(|c| c.items.len()).sum()
    }

    /// Validate every category. Used at the storage boundary.
    pub fn validate(&self) -> Result<()> {
        self.0.iter().try_for_each(ShoppingListCategory::validate)
    }

    pub fn into_inner(self) -> Vec<ShoppingListCategory> {
        self.0
    }
}

impl From<Vec<ShoppingListCategory>> for ShoppingList {
    fn from(categories: Vec<ShoppingListCategory>) -> Self {
        Self(categories)
    }
}

impl IntoIterator for ShoppingList {
    type Item = ShoppingListCategory;
    type IntoIter = std::vec::IntoIter<ShoppingListCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ShoppingList {
    type Item = &'a ShoppingListCategory;
    type IntoIter = std::slice::Iter<'a, ShoppingListCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Opaque caller identity handed in by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned to a stored recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(u64);

impl RecipeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = ShoppingListError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| ShoppingListError::InvalidRecord(format!("bad recipe id '{}': {}", s, e)))
    }
}

/// A recipe about to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub user_id: UserId,
    /// The meal description the user typed.
    pub description: String,
    pub shopping_list: ShoppingList,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub description: String,
    pub shopping_list: ShoppingList,
    pub created_at: u64,
}

impl Recipe {
    pub(crate) fn from_new(id: RecipeId, new: NewRecipe) -> Self {
        Self {
            id,
            user_id: new.user_id,
            description: new.description,
            shopping_list: new.shopping_list,
            created_at: new.created_at,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}
