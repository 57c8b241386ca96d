//! Unified error type for the store layer.
//!
//! Most store failures are recovered where they happen (an unreadable catalog
//! or cart is logged and replaced by an empty one). What is left reaches the
//! caller as one of these.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::persistence::PersistenceError;

/// Any error the store layer hands back to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog document could not be fetched.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A document could not be stored.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// An order operation was refused.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}

/// Result alias defaulting to the store [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
