//! Shared fixtures for the cross-store scenario tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bistro-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart merging, totals, persistence round trips
//! - `order_ledger` - Order placement, IDs across reloads, status updates
//! - `menu_browsing` - Catalog loading and the filter pipeline

use std::sync::Arc;

use bistro_core::{CartLine, MenuItem, MenuItemId, OrderRequest, PaymentMethod};
use bistro_store::AppState;
use bistro_store::catalog::StaticCatalogSource;
use bistro_store::config::StoreConfig;
use bistro_store::persistence::KeyValueStore;

/// A small catalog: two categories, five items, one of them unavailable.
pub const MENU_JSON: &str = r#"{
    "categories": [
        {"id": 1, "name": "Pizza", "description": "Wood-fired"},
        {"id": 2, "name": "Pasta", "description": "Fresh daily"}
    ],
    "menuItems": [
        {"id": 1, "name": "Margherita", "description": "Tomato, mozzarella, basil",
         "price": "10.00", "categoryId": 1, "ingredients": ["Tomato", "Mozzarella", "Basil"],
         "isVegetarian": true, "isSpicy": false, "preparationTime": 12, "isAvailable": true},
        {"id": 2, "name": "Garlic Bread", "description": "With rosemary",
         "price": "5.50", "categoryId": 1, "ingredients": ["Bread", "Garlic", "Rosemary"],
         "isVegetarian": true, "isSpicy": false, "preparationTime": 6, "isAvailable": true},
        {"id": 3, "name": "Diavola", "description": "Spicy salami",
         "price": "13.00", "categoryId": 1, "ingredients": ["Tomato", "Salami", "Chili"],
         "isVegetarian": false, "isSpicy": true, "preparationTime": 12, "isAvailable": true},
        {"id": 4, "name": "Carbonara", "description": "Egg and pecorino",
         "price": "14.00", "categoryId": 2, "ingredients": ["Egg", "Pecorino", "Guanciale"],
         "isVegetarian": false, "isSpicy": false, "preparationTime": 15, "isAvailable": true},
        {"id": 5, "name": "Truffle Tagliatelle", "description": "Seasonal",
         "price": "24.00", "categoryId": 2, "ingredients": ["Truffle", "Butter"],
         "isVegetarian": true, "isSpicy": false, "preparationTime": 15, "isAvailable": false}
    ]
}"#;

/// Open an [`AppState`] over `storage` with [`MENU_JSON`] loaded.
pub async fn open_state(storage: Arc<dyn KeyValueStore>) -> AppState {
    open_state_with(StoreConfig::default(), storage).await
}

/// Like [`open_state`] with a custom configuration.
pub async fn open_state_with(config: StoreConfig, storage: Arc<dyn KeyValueStore>) -> AppState {
    let state = AppState::with_storage(config, storage);
    state
        .catalog()
        .load(&StaticCatalogSource::new(MENU_JSON))
        .await;
    state
}

/// Look up a catalog item, panicking if it is not loaded.
///
/// # Panics
///
/// Panics if no item has `id`.
#[must_use]
pub fn item(state: &AppState, id: u32) -> Arc<MenuItem> {
    match state.catalog().find(MenuItemId::new(id)) {
        Some(item) => item,
        None => panic!("menu item {id} is not in the fixture catalog"),
    }
}

/// A checkout request for `items`.
#[must_use]
pub fn order_request(customer_name: &str, items: Vec<CartLine>) -> OrderRequest {
    OrderRequest {
        customer_name: customer_name.to_owned(),
        customer_email: "guest@trattoria.example".to_owned(),
        customer_phone: "+1 (555) 010-0100".to_owned(),
        items,
        payment_method: PaymentMethod::Card,
        delivery_address: Some("221B Baker Street, London".to_owned()),
        special_requests: None,
    }
}
