//! Menu browsing commands.

use bistro_core::{CategoryId, MenuItem, MenuItemId, Price};
use bistro_store::AppState;
use rust_decimal::Decimal;

use super::CliError;

/// Filters for `menu list`.
#[derive(Debug, Default)]
pub struct ListArgs {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub vegetarian: bool,
    pub spicy: bool,
    pub max_price: Option<Decimal>,
}

/// Print every category.
pub fn categories(state: &AppState) {
    let categories = state.catalog().categories().get();
    if categories.is_empty() {
        println!("No categories loaded.");
        return;
    }
    for category in categories.iter() {
        println!("{:>3}  {:<20} {}", category.id, category.name, category.description);
    }
}

/// Print the available items that pass `args`.
///
/// # Errors
///
/// Returns an error if `max_price` is negative.
pub fn list(state: &AppState, args: ListArgs) -> Result<(), CliError> {
    let max_price = args.max_price.map(Price::new).transpose()?;

    let menu = state.menu();
    menu.select_category(args.category);
    menu.set_search(args.search.unwrap_or_default());
    menu.set_vegetarian_only(args.vegetarian);
    menu.set_spicy_only(args.spicy);
    menu.set_max_price(max_price);

    let items = menu.results().get();
    if items.is_empty() {
        println!("No items match.");
        return Ok(());
    }
    for item in items.iter() {
        println!(
            "{:>3}  {:<28} {:>8}  {}",
            item.id,
            item.name,
            item.price.to_string(),
            badges(item)
        );
    }
    Ok(())
}

/// Print everything known about one item.
///
/// # Errors
///
/// Returns [`CliError::ItemNotFound`] if no item has `id`.
pub fn show(state: &AppState, id: MenuItemId) -> Result<(), CliError> {
    let item = state
        .catalog()
        .find(id)
        .ok_or(CliError::ItemNotFound(id))?;
    let category = state.catalog().category_name(item.category_id).get();

    println!("{} - {}", item.name, item.price);
    println!("  {}", item.description);
    println!("  Category: {category}");
    if !item.ingredients.is_empty() {
        println!("  Ingredients: {}", item.ingredients.join(", "));
    }
    println!("  Preparation: {} min", item.preparation_time);
    if let Some(calories) = item.calories {
        println!("  Calories: {calories}");
    }
    let tags = badges(&item);
    if !tags.is_empty() {
        println!("  {tags}");
    }
    if !item.is_available {
        println!("  Currently unavailable");
    }
    if state.cart().contains(id).get() {
        println!("  In your cart");
    }
    Ok(())
}

fn badges(item: &MenuItem) -> String {
    let mut tags = Vec::new();
    if item.is_vegetarian {
        tags.push("vegetarian");
    }
    if item.is_spicy {
        tags.push("spicy");
    }
    tags.join(", ")
}
