//! Cart error taxonomy.
//!
//! Every rejected cart operation maps onto one of a few fixed, user-facing
//! messages. The underlying cause stays attached as the error's `source()` so
//! logs and Sentry still see what actually went wrong.

use rocketcart_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::store::StoreError;

/// Shown when stock cannot cover the requested quantity.
pub const OUT_OF_STOCK_MESSAGE: &str = "requested quantity out of stock";
/// Shown when adding a product fails for any other reason.
pub const ADD_FAILED_MESSAGE: &str = "error adding product";
/// Shown when removing a product fails.
pub const REMOVE_FAILED_MESSAGE: &str = "error removing product";
/// Shown when changing a quantity fails for any other reason.
pub const UPDATE_FAILED_MESSAGE: &str = "error changing product quantity";

/// The three cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    /// Add one unit of a product.
    Add,
    /// Remove a product's line.
    Remove,
    /// Set a product's quantity.
    Update,
}

impl CartOperation {
    /// User-facing message for a non-stock failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => ADD_FAILED_MESSAGE,
            Self::Remove => REMOVE_FAILED_MESSAGE,
            Self::Update => UPDATE_FAILED_MESSAGE,
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Add => "add product",
            Self::Remove => "remove product",
            Self::Update => "update quantity",
        })
    }
}

/// Why a cart operation was rejected.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock does not cover the requested quantity.
    #[error("Out of stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The product is not in the cart.
    #[error("Cannot {operation}: product {product_id} is not in the cart")]
    NotFound {
        operation: CartOperation,
        product_id: ProductId,
    },

    /// The inventory lookup or the durable write failed.
    #[error("Failed to {operation} for product {product_id}: {source}")]
    OperationFailed {
        operation: CartOperation,
        product_id: ProductId,
        #[source]
        source: FailureCause,
    },
}

/// Underlying cause of [`CartError::OperationFailed`].
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Inventory service call failed.
    #[error("inventory: {0}")]
    Inventory(#[from] InventoryError),

    /// Saving the cart failed.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// The cart could not be serialized.
    #[error("serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// The fixed message shown to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => OUT_OF_STOCK_MESSAGE,
            Self::NotFound { operation, .. } | Self::OperationFailed { operation, .. } => {
                operation.failure_message()
            }
        }
    }

    /// Product the rejected operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::OutOfStock { product_id, .. }
            | Self::NotFound { product_id, .. }
            | Self::OperationFailed { product_id, .. } => *product_id,
        }
    }

    pub(crate) fn failed(
        operation: CartOperation,
        product_id: ProductId,
        source: impl Into<FailureCause>,
    ) -> Self {
        Self::OperationFailed {
            operation,
            product_id,
            source: source.into(),
        }
    }
}

/// Result type alias for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
