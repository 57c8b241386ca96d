//! Menu catalog: categories and items, loaded once per session.
//!
//! The catalog has no mutation API. [`CatalogStore::load`] fetches the
//! catalog document from a [`CatalogSource`] once; every other method returns
//! a replay-latest view that follows the loaded data.
//!
//! A failed load never reaches the caller. The error is logged and the store
//! settles on an empty catalog.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bistro_core::{Category, CategoryId, MenuItem, MenuItemId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observable::{Observable, Subject};

/// Snapshot of the loaded categories.
pub type Categories = Arc<[Category]>;

/// Snapshot of a list of menu items. Items are shared, never copied.
pub type Items = Arc<[Arc<MenuItem>]>;

/// Label used when an item points at a category that is not loaded.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Errors that can occur while fetching the catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid catalog.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The catalog document: `{ "categories": [...], "menuItems": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

impl CatalogDocument {
    /// Parse a document from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the bytes are not a valid catalog.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Where the catalog document comes from.
pub trait CatalogSource: Send + Sync {
    /// Fetch the whole document.
    fn fetch(&self) -> impl Future<Output = Result<CatalogDocument, CatalogError>> + Send;
}

/// Reads the catalog from a JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;
        CatalogDocument::from_slice(&bytes)
    }
}

/// Serves a catalog document held in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    json: String,
}

impl StaticCatalogSource {
    /// Serve the given JSON text. It is parsed on every fetch.
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        CatalogDocument::from_slice(self.json.as_bytes())
    }
}

/// Tri-state item filter: `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub vegetarian: Option<bool>,
    pub spicy: Option<bool>,
    pub max_price: Option<Price>,
    /// Matched case-insensitively against name and description.
    pub search_term: Option<String>,
}

impl ItemQuery {
    /// Whether `item` satisfies every set constraint.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        if self.vegetarian.is_some_and(|v| item.is_vegetarian != v) {
            return false;
        }
        if self.spicy.is_some_and(|s| item.is_spicy != s) {
            return false;
        }
        if self.max_price.is_some_and(|max| item.price > max) {
            return false;
        }
        match self.search_term.as_deref().map(str::to_lowercase) {
            Some(term) if !term.is_empty() => {
                item.name.to_lowercase().contains(&term)
                    || item.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Holds the session's categories and menu items.
#[derive(Debug)]
pub struct CatalogStore {
    categories: Subject<Categories>,
    items: Subject<Items>,
    available: Observable<Items>,
    loaded: AtomicBool,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty, not yet loaded catalog.
    #[must_use]
    pub fn new() -> Self {
        let categories = Subject::new(Categories::from(Vec::new()));
        let items = Subject::new(Items::from(Vec::new()));
        let available = items.observe().map(|items: &Items| {
            items
                .iter()
                .filter(|item| item.is_available)
                .cloned()
                .collect::<Items>()
        });

        Self {
            categories,
            items,
            available,
            loaded: AtomicBool::new(false),
        }
    }

    /// Fetch the catalog document and publish it.
    ///
    /// Only the first call in a session does anything. A failed fetch is
    /// logged and leaves the catalog empty.
    pub async fn load(&self, source: &impl CatalogSource) {
        if self.loaded.swap(true, Ordering::SeqCst) {
            tracing::warn!("menu catalog already loaded; ignoring reload");
            return;
        }

        let document = match source.fetch().await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "failed to load menu catalog; continuing with an empty menu");
                CatalogDocument::default()
            }
        };

        tracing::info!(
            categories = document.categories.len(),
            items = document.menu_items.len(),
            "menu catalog loaded"
        );

        self.categories.publish(Categories::from(document.categories));
        self.items
            .publish(document.menu_items.into_iter().map(Arc::new).collect());
    }

    /// Whether `load` has been called.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// All categories, in document order.
    #[must_use]
    pub fn categories(&self) -> Observable<Categories> {
        self.categories.observe()
    }

    /// All menu items, in document order.
    #[must_use]
    pub fn items(&self) -> Observable<Items> {
        self.items.observe()
    }

    /// Items currently marked available.
    #[must_use]
    pub fn available_items(&self) -> Observable<Items> {
        self.available.clone()
    }

    /// The item with `id`, or `None` while no such item is loaded.
    #[must_use]
    pub fn item_by_id(&self, id: MenuItemId) -> Observable<Option<Arc<MenuItem>>> {
        self.items
            .observe()
            .map(move |items: &Items| items.iter().find(|item| item.id == id).cloned())
    }

    /// Items listed under `category_id`.
    #[must_use]
    pub fn items_by_category(&self, category_id: CategoryId) -> Observable<Items> {
        self.items.observe().map(move |items: &Items| {
            items
                .iter()
                .filter(|item| item.category_id == category_id)
                .cloned()
                .collect::<Items>()
        })
    }

    /// Display name of a category, or [`UNKNOWN_CATEGORY`].
    #[must_use]
    pub fn category_name(&self, id: CategoryId) -> Observable<String> {
        self.categories.observe().map(move |categories: &Categories| {
            categories
                .iter()
                .find(|category| category.id == id)
                .map_or_else(|| UNKNOWN_CATEGORY.to_owned(), |category| category.name.clone())
        })
    }

    /// Items matching `query`.
    #[must_use]
    pub fn filter_items(&self, query: ItemQuery) -> Observable<Items> {
        self.items.observe().map(move |items: &Items| {
            items
                .iter()
                .filter(|item| query.matches(item))
                .cloned()
                .collect::<Items>()
        })
    }

    /// Look up an item in the current snapshot.
    #[must_use]
    pub fn find(&self, id: MenuItemId) -> Option<Arc<MenuItem>> {
        self.items
            .with(|items| items.iter().find(|item| item.id == id).cloned())
    }
}
