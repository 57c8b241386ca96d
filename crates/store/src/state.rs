//! Application state shared by every consumer of the stores.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::{CatalogStore, FileCatalogSource};
use crate::config::StoreConfig;
use crate::menu::MenuBrowser;
use crate::orders::OrderStore;
use crate::persistence::{FileStore, KeyValueStore};

/// The catalog, cart, order ledger, and menu browser of one session.
///
/// This struct is cheaply cloneable via `Arc`. Build it once at startup and
/// pass it to whatever needs the stores.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: StoreConfig,
    catalog: CatalogStore,
    menu: MenuBrowser,
    cart: CartStore,
    orders: OrderStore,
}

impl AppState {
    /// Open the stores described by `config`.
    ///
    /// Persistence goes to a [`FileStore`] in `config.data_dir`, and the
    /// catalog is loaded from `config.catalog_path`. Neither can fail: missing
    /// or broken documents leave the affected store empty.
    pub async fn open(config: StoreConfig) -> Self {
        let storage = Arc::new(FileStore::new(&config.data_dir));
        let source = FileCatalogSource::new(&config.catalog_path);
        let state = Self::with_storage(config, storage);
        state.catalog().load(&source).await;
        state
    }

    /// Open the stores over `storage` with an empty, unloaded catalog.
    #[must_use]
    pub fn with_storage(config: StoreConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let catalog = CatalogStore::new();
        let menu = MenuBrowser::new(&catalog);
        let cart = CartStore::open(Arc::clone(&storage), config.pricing);
        let orders = OrderStore::open(storage, config.orders);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                menu,
                cart,
                orders,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn menu(&self) -> &MenuBrowser {
        &self.inner.menu
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::MENU_JSON;

    #[tokio::test]
    async fn test_open_loads_catalog_and_restores_cart() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("menu-data.json");
        std::fs::write(&catalog_path, MENU_JSON).unwrap();
        let config = StoreConfig {
            data_dir: dir.path().join("state"),
            catalog_path,
            ..StoreConfig::default()
        };

        let state = AppState::open(config.clone()).await;
        assert_eq!(state.menu().results().get().len(), 3);
        let item = state
            .catalog()
            .find(bistro_core::MenuItemId::new(1))
            .unwrap();
        state.cart().add_line(item, 2, None);
        drop(state);

        let reopened = AppState::open(config).await;
        assert_eq!(reopened.cart().count().get(), 2);
        assert!(dir.path().join("state").join("cart.json").exists());
    }

    #[tokio::test]
    async fn test_missing_catalog_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            data_dir: dir.path().to_path_buf(),
            catalog_path: dir.path().join("absent.json"),
            ..StoreConfig::default()
        };

        let state = AppState::open(config).await;
        assert!(state.catalog().is_loaded());
        assert!(state.catalog().items().get().is_empty());
        assert!(state.cart().is_empty());
    }
}
