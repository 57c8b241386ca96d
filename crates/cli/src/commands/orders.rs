//! Order ledger commands.

use bistro_core::{OrderId, OrderStatus};
use bistro_store::AppState;

use super::{CliError, print_order};

/// Print a one-line summary of every order, oldest first.
pub fn list(state: &AppState) {
    let orders = state.orders().orders().get();
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }
    for order in &orders {
        println!(
            "#{:<4} {:<10} {:>9}  {:>2} items  {}",
            order.id,
            order.status.to_string(),
            order.total_amount.to_string(),
            order.item_count(),
            order.customer.name
        );
    }
}

/// Print one order in full.
///
/// # Errors
///
/// Returns an error if no order has `id`.
pub fn show(state: &AppState, id: OrderId) -> Result<(), CliError> {
    let order = state
        .orders()
        .get(id)
        .ok_or(bistro_store::orders::OrderError::NotFound(id))?;
    print_order(&order);
    Ok(())
}

/// Set the status of an order and wait for it to be acknowledged.
///
/// # Errors
///
/// Returns an error if no order has `id` or the step is not allowed.
pub async fn set_status(
    state: &AppState,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), CliError> {
    let order = state.orders().update_status(id, status).await?;
    println!("Order #{} is now {}.", order.id, order.status);
    Ok(())
}

/// Cancel an order.
///
/// # Errors
///
/// Returns an error if no order has `id` or it can no longer be cancelled.
pub async fn cancel(state: &AppState, id: OrderId) -> Result<(), CliError> {
    let order = state.orders().cancel_order(id).await?;
    println!("Order #{} cancelled.", order.id);
    Ok(())
}
