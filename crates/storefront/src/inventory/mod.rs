//! Inventory service seam.
//!
//! The cart consults inventory for two read-only facts: how many units of a
//! product are available, and the product's display metadata. Both calls may
//! fail; the cart never distinguishes one failure cause from another when
//! talking to the shopper, but the cause is kept for diagnostics.
//!
//! - [`InventoryService`] - the trait the cart manager depends on
//! - [`HttpInventory`] - `reqwest` client for the inventory REST API

mod client;

pub use client::HttpInventory;

use std::future::Future;

use rocketcart_core::{ProductDetails, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inventory has no record of the product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read-only access to stock levels and product metadata.
///
/// Implementations must be shareable across tasks; the cart manager holds one
/// behind an `Arc` and may call it from any runtime worker.
pub trait InventoryService: Send + Sync {
    /// Current stock snapshot for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Display metadata for `id`.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductDetails, InventoryError>> + Send;
}
