//! Bistro Core - Shared domain types.
//!
//! This crate provides the records shared by every Bistro component:
//! - `store` - Reactive catalog, cart, and order stores
//! - `cli` - Command-line front end over the stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no async,
//! no persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, statuses, menu, cart, and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
