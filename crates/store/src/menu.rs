//! Menu browsing: the available items narrowed by live filter criteria.

use bistro_core::{CategoryId, MenuItem, Price};

use crate::catalog::{CatalogStore, Items};
use crate::observable::{Observable, Subject};

/// What the menu screen is currently filtering by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    /// Only items in this category.
    pub category: Option<CategoryId>,
    /// Free-text search over name, description, and ingredients.
    pub search: String,
    pub vegetarian_only: bool,
    pub spicy_only: bool,
    /// Upper price bound. Zero means no bound.
    pub max_price: Option<Price>,
}

impl MenuFilter {
    /// Whether `item` passes every active criterion.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        if self.category.is_some_and(|category| item.category_id != category) {
            return false;
        }
        if self.vegetarian_only && !item.is_vegetarian {
            return false;
        }
        if self.spicy_only && !item.is_spicy {
            return false;
        }
        if self
            .max_price
            .is_some_and(|max| !max.is_zero() && item.price > max)
        {
            return false;
        }

        let term = self.search.trim().to_lowercase();
        term.is_empty() || item.mentions(&term)
    }

    /// Whether any criterion is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }
}

/// The menu screen's state: a filter and the items it lets through.
///
/// The result list is recomputed once per effective change of either the
/// filter or the catalog.
#[derive(Debug)]
pub struct MenuBrowser {
    filter: Subject<MenuFilter>,
    results: Observable<Items>,
}

impl MenuBrowser {
    /// Browse the available items of `catalog`.
    #[must_use]
    pub fn new(catalog: &CatalogStore) -> Self {
        let filter = Subject::new(MenuFilter::default());
        let results = catalog.available_items().combine(
            &filter.observe(),
            |items: &Items, filter: &MenuFilter| {
                items
                    .iter()
                    .filter(|item| filter.matches(item))
                    .cloned()
                    .collect::<Items>()
            },
        );
        Self { filter, results }
    }

    /// Items passing the current filter.
    #[must_use]
    pub fn results(&self) -> Observable<Items> {
        self.results.clone()
    }

    /// The current filter.
    #[must_use]
    pub fn filter(&self) -> Observable<MenuFilter> {
        self.filter.observe()
    }

    /// Show only `category`, or every category with `None`.
    pub fn select_category(&self, category: Option<CategoryId>) -> bool {
        self.update(|filter| set(&mut filter.category, category))
    }

    pub fn set_search(&self, term: impl Into<String>) -> bool {
        let term = term.into();
        self.update(|filter| set(&mut filter.search, term))
    }

    pub fn set_vegetarian_only(&self, on: bool) -> bool {
        self.update(|filter| set(&mut filter.vegetarian_only, on))
    }

    pub fn set_spicy_only(&self, on: bool) -> bool {
        self.update(|filter| set(&mut filter.spicy_only, on))
    }

    pub fn set_max_price(&self, max_price: Option<Price>) -> bool {
        self.update(|filter| set(&mut filter.max_price, max_price))
    }

    /// Reset every criterion.
    pub fn clear_filters(&self) -> bool {
        self.filter.publish(MenuFilter::default())
    }

    fn update(&self, f: impl FnOnce(&mut MenuFilter) -> bool) -> bool {
        let changed = self.filter.modify(f);
        if changed {
            tracing::debug!(filter = ?self.filter.get(), "menu filter changed");
        }
        changed
    }
}

fn set<V: PartialEq>(slot: &mut V, value: V) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::loaded_catalog;

    fn ids(items: &Items) -> Vec<u32> {
        items.iter().map(|item| item.id.as_u32()).collect()
    }

    #[tokio::test]
    async fn test_starts_with_available_items() {
        let catalog = loaded_catalog().await;
        let browser = MenuBrowser::new(&catalog);
        assert!(!browser.filter().get().is_active());
        assert_eq!(ids(&browser.results().get()), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_follows_catalog_load() {
        let catalog = CatalogStore::new();
        let browser = MenuBrowser::new(&catalog);
        browser.set_spicy_only(true);
        assert!(browser.results().get().is_empty());

        catalog
            .load(&crate::catalog::StaticCatalogSource::new(
                crate::catalog::tests::MENU_JSON,
            ))
            .await;
        assert_eq!(ids(&browser.results().get()), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_criteria_combine() {
        let catalog = loaded_catalog().await;
        let browser = MenuBrowser::new(&catalog);

        browser.select_category(Some(CategoryId::new(2)));
        assert_eq!(ids(&browser.results().get()), vec![4]);

        browser.select_category(None);
        browser.set_vegetarian_only(true);
        assert_eq!(ids(&browser.results().get()), vec![1, 4]);

        browser.set_spicy_only(true);
        assert_eq!(ids(&browser.results().get()), vec![4]);

        browser.set_max_price(Some(Price::from_cents(1100)));
        assert!(browser.results().get().is_empty());

        assert!(browser.clear_filters());
        assert_eq!(ids(&browser.results().get()), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_zero_max_price_is_unbounded() {
        let catalog = loaded_catalog().await;
        let browser = MenuBrowser::new(&catalog);
        browser.set_max_price(Some(Price::ZERO));
        assert_eq!(browser.results().get().len(), 3);
    }

    #[tokio::test]
    async fn test_search_matches_ingredients() {
        let catalog = loaded_catalog().await;
        let browser = MenuBrowser::new(&catalog);

        browser.set_search("  CHILI ");
        assert_eq!(ids(&browser.results().get()), vec![2, 4]);

        browser.set_search("mozzarella");
        assert_eq!(ids(&browser.results().get()), vec![1]);

        browser.set_search("   ");
        assert_eq!(browser.results().get().len(), 3);
    }

    #[tokio::test]
    async fn test_noop_setter_does_not_republish() {
        let catalog = loaded_catalog().await;
        let browser = MenuBrowser::new(&catalog);
        let mut results = browser.results().subscribe();
        results.next().await.unwrap();

        assert!(!browser.set_vegetarian_only(false));
        assert!(!browser.clear_filters());
        assert!(!results.has_pending());

        assert!(browser.set_search("pizza"));
        // No item mentions "pizza", so the list changed.
        assert!(results.has_pending());
        assert!(results.next().await.unwrap().is_empty());
    }
}
