//! Command implementations.
//!
//! Each command reads or changes the stores in [`bistro_store::AppState`] and
//! prints plain text to stdout. Log output goes to stderr.

#![allow(clippy::print_stdout)]

use bistro_core::{CartLine, LineId, MenuItemId, Order};
use thiserror::Error;

pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;

/// Errors that end a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CliError {
    /// A store refused the operation.
    #[error(transparent)]
    Store(#[from] bistro_store::Error),

    /// No such menu item.
    #[error("Menu item {0} not found")]
    ItemNotFound(MenuItemId),

    /// The item exists but cannot be ordered right now.
    #[error("Menu item {0} is not available")]
    ItemUnavailable(MenuItemId),

    /// No cart line matches what the user typed.
    #[error("No cart line matches '{0}'")]
    LineNotFound(String),

    /// A line that was just resolved disappeared.
    #[error("Cart line {0} is gone")]
    LineGone(LineId),

    /// Checkout with nothing in the cart.
    #[error("The cart is empty")]
    EmptyCart,

    /// Checkout details failed validation.
    #[error("Invalid checkout details: {}", .0.join("; "))]
    InvalidCheckout(Vec<String>),

    /// A price argument was negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] bistro_core::PriceError),
}

impl From<bistro_store::orders::OrderError> for CliError {
    fn from(e: bistro_store::orders::OrderError) -> Self {
        Self::Store(e.into())
    }
}

/// Print cart lines, numbered from 1.
fn print_lines(lines: &[CartLine]) {
    for (number, line) in lines.iter().enumerate() {
        let note = line
            .special_instructions
            .as_deref()
            .map(|note| format!(" ({note})"))
            .unwrap_or_default();
        println!(
            "{:>3}. {:>2} x {:<28} {:>9}{note}",
            number + 1,
            line.quantity,
            line.menu_item.name,
            line.line_total().to_string(),
        );
    }
}

/// Print an order header and its lines.
fn print_order(order: &Order) {
    println!(
        "Order #{} - {} - {}",
        order.id,
        order.status,
        order.order_date.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "  {} <{}> {}",
        order.customer.name, order.customer.email, order.customer.phone
    );
    if let Some(address) = &order.delivery_address {
        println!("  Deliver to: {address}");
    }
    if let Some(requests) = &order.special_requests {
        println!("  Requests: {requests}");
    }
    print_lines(&order.items);
    println!(
        "  Total: {} ({} items, paid by {})",
        order.total_amount,
        order.item_count(),
        order.payment_method
    );
}
