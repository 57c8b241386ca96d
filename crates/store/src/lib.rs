//! Bistro state layer.
//!
//! Single-source-of-truth stores for a restaurant storefront:
//!
//! - [`catalog::CatalogStore`] - categories and menu items, loaded once
//! - [`menu::MenuBrowser`] - the available items under live filters
//! - [`cart::CartStore`] - cart lines with derived totals, persisted on change
//! - [`orders::OrderStore`] - the order ledger, persisted on change
//!
//! Every store publishes its state through [`observable::Observable`] views
//! that replay the latest value to new subscribers. Derived views (totals,
//! filtered lists) are computed once per change and shared by all of their
//! subscribers. [`state::AppState`] wires the stores together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod menu;
pub mod observable;
pub mod orders;
pub mod persistence;
pub mod pricing;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;
