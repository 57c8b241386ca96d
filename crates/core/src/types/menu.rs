//! Catalog records: categories and menu items.
//!
//! Field names follow the catalog document (`categoryId`, `isVegetarian`, ...).

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, MenuItemId};
use super::price::Price;

/// A menu section such as "Starters" or "Desserts".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A single dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Category this item is listed under. Not checked against loaded categories.
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_spicy: bool,
    /// Preparation time in minutes.
    #[serde(default)]
    pub preparation_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

impl MenuItem {
    /// Case-insensitive match of `term` against name, description, and ingredients.
    ///
    /// `term` is expected to be lowercase already.
    #[must_use]
    pub fn mentions(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.description.to_lowercase().contains(term)
            || self
                .ingredients
                .iter()
                .any(|ingredient| ingredient.to_lowercase().contains(term))
    }
}
