//! Cart commands.

use bistro_core::{LineId, MenuItemId, clamp_quantity};
use bistro_store::AppState;

use super::{CliError, print_lines};

/// Print the cart lines and the checkout summary.
pub fn show(state: &AppState) {
    let cart = state.cart();
    let lines = cart.lines().get();
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    print_lines(&lines);
    let summary = cart.summary().get();
    println!();
    println!("  Subtotal:  {:>9}", summary.subtotal.to_string());
    println!("  Tax:       {:>9}", summary.tax.to_string());
    println!("  Delivery:  {:>9}", summary.delivery_fee.to_string());
    println!("  Total:     {:>9}", summary.grand_total.to_string());
    println!("  {} items", summary.item_count);
}

/// Add an item to the cart. The quantity is clamped to 1-99.
///
/// # Errors
///
/// Returns an error if the item does not exist or is unavailable.
pub fn add(
    state: &AppState,
    item_id: MenuItemId,
    quantity: i64,
    note: Option<String>,
) -> Result<(), CliError> {
    let item = state
        .catalog()
        .find(item_id)
        .ok_or(CliError::ItemNotFound(item_id))?;
    if !item.is_available {
        return Err(CliError::ItemUnavailable(item_id));
    }

    let quantity = clamp_quantity(quantity);
    let name = item.name.clone();
    state.cart().add_line(item, quantity, note);
    println!(
        "Added {quantity} x {name}. Cart: {} items, {}",
        state.cart().count().get(),
        state.cart().total().get()
    );
    Ok(())
}

/// Change the quantity of a line. Zero or less removes it; more than 99 is
/// capped.
///
/// # Errors
///
/// Returns [`CliError::LineNotFound`] if `line` matches no cart line.
pub fn set(state: &AppState, line: &str, quantity: i64) -> Result<(), CliError> {
    let line_id = resolve_line(state, line)?;
    let quantity = if quantity <= 0 {
        quantity
    } else {
        i64::from(clamp_quantity(quantity))
    };

    if !state.cart().set_quantity(line_id, quantity) {
        return Err(CliError::LineGone(line_id));
    }
    if quantity <= 0 {
        println!("Removed line {line}.");
    } else {
        println!("Line {line} now has {quantity}.");
    }
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns [`CliError::LineNotFound`] if `line` matches no cart line.
pub fn remove(state: &AppState, line: &str) -> Result<(), CliError> {
    let line_id = resolve_line(state, line)?;
    if !state.cart().remove_line(line_id) {
        return Err(CliError::LineGone(line_id));
    }
    println!("Removed line {line}.");
    Ok(())
}

/// Empty the cart.
pub fn clear(state: &AppState) {
    state.cart().clear();
    println!("Cart cleared.");
}

/// Turn a 1-based line number or a line ID into a line ID.
fn resolve_line(state: &AppState, input: &str) -> Result<LineId, CliError> {
    let input = input.trim();
    let lines = state.cart().snapshot();

    let found = if let Ok(number) = input.parse::<usize>() {
        number
            .checked_sub(1)
            .and_then(|index| lines.get(index))
            .map(|line| line.id)
    } else {
        input
            .parse::<LineId>()
            .ok()
            .filter(|id| lines.iter().any(|line| line.id == *id))
    };

    found.ok_or_else(|| CliError::LineNotFound(input.to_owned()))
}
