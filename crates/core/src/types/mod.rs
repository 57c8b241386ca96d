//! Domain types for the Bistro stores.
//!
//! This module provides type-safe wrappers and records for the menu, the
//! cart, and the order ledger.

pub mod cart;
pub mod email;
pub mod id;
pub mod menu;
pub mod order;
pub mod price;
pub mod status;

pub use cart::{
    CartLine, MAX_LINE_QUANTITY, MergeKey, clamp_quantity, lines_count, lines_total,
    normalize_note,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use menu::{Category, MenuItem};
pub use order::{Customer, Order, OrderRequest};
pub use price::{Price, PriceError};
pub use status::*;
