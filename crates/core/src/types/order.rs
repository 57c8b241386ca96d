//! Orders, the customers who place them, and the request that creates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{CartLine, lines_total};
use super::id::{CustomerId, OrderId};
use super::price::Price;
use super::status::{OrderStatus, PaymentMethod};

/// The person an order belongs to.
///
/// Loyalty points are derived by the store, never taken from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    loyalty_points: u32,
}

impl Customer {
    /// Create a customer with no loyalty points.
    #[must_use]
    pub const fn new(id: CustomerId, name: String, email: String, phone: String) -> Self {
        Self {
            id,
            name,
            email,
            phone,
            loyalty_points: 0,
        }
    }

    /// Loyalty points accrued by this customer.
    #[must_use]
    pub const fn loyalty_points(&self) -> u32 {
        self.loyalty_points
    }
}

/// Everything the checkout form collects.
///
/// `items` is a snapshot of the cart taken by the caller; the order keeps its
/// own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl OrderRequest {
    /// Sum of the requested lines at their current prices.
    #[must_use]
    pub fn total(&self) -> Price {
        lines_total(&self.items)
    }
}

/// A placed order.
///
/// Created once, then changed only through its status. The total is frozen at
/// placement time and is not recomputed from `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: Customer,
    pub items: Vec<CartLine>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub order_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl Order {
    /// Build a pending order from a request.
    #[must_use]
    pub fn from_request(
        id: OrderId,
        customer_id: CustomerId,
        request: OrderRequest,
        order_date: DateTime<Utc>,
    ) -> Self {
        let total_amount = request.total();
        let customer = Customer::new(
            customer_id,
            request.customer_name,
            request.customer_email,
            request.customer_phone,
        );

        Self {
            id,
            customer,
            items: request.items,
            total_amount,
            status: OrderStatus::Pending,
            payment_method: request.payment_method,
            delivery_address: request.delivery_address,
            order_date,
            special_requests: request.special_requests,
        }
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}
