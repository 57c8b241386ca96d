//! Checkout arithmetic: tax, delivery fee, and grand total for a cart.

use bistro_core::{CartLine, Price, lines_count, lines_total};
use rust_decimal::Decimal;
use serde::Serialize;

/// Tax and delivery rules applied to a cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    /// Fraction of the subtotal charged as tax (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Subtotals at or above this amount ship free.
    pub free_delivery_threshold: Price,
    /// Fee charged below the threshold.
    pub delivery_fee: Price,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            free_delivery_threshold: Price::from_cents(5000),
            delivery_fee: Price::from_cents(599),
        }
    }
}

impl Pricing {
    /// Tax on `subtotal`, rounded to cents.
    #[must_use]
    pub fn tax(&self, subtotal: Price) -> Price {
        subtotal.scaled(self.tax_rate)
    }

    /// Delivery fee for `subtotal`. An empty order has nothing to deliver.
    #[must_use]
    pub fn delivery_fee(&self, subtotal: Price) -> Price {
        if subtotal.is_zero() || subtotal >= self.free_delivery_threshold {
            Price::ZERO
        } else {
            self.delivery_fee
        }
    }

    /// Price out a list of cart lines.
    #[must_use]
    pub fn summarize(&self, lines: &[CartLine]) -> CartSummary {
        let subtotal = lines_total(lines).rounded();
        let tax = self.tax(subtotal);
        let delivery_fee = self.delivery_fee(subtotal);

        CartSummary {
            subtotal,
            tax,
            delivery_fee,
            grand_total: subtotal + tax + delivery_fee,
            item_count: lines_count(lines),
        }
    }
}

/// What the cart screen shows under the line list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub delivery_fee: Price,
    pub grand_total: Price,
    pub item_count: u32,
}
