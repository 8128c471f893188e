//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductDetails, ProductId};

/// One product entry in the cart with its chosen quantity.
///
/// Serialized with the storefront's historical field names
/// (`id`, `title`, `price`, `image`, `amount`) so carts saved by earlier
/// clients load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID, unique within a cart.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Display name.
    #[serde(rename = "title")]
    pub name: String,
    /// Unit price at the time the product was added.
    pub price: Price,
    /// Image URL or asset reference.
    #[serde(rename = "image")]
    pub image_ref: String,
    /// Selected quantity, at least 1 for any line held by a cart.
    #[serde(rename = "amount")]
    pub quantity: u32,
}

impl LineItem {
    /// Create a line holding a single unit of `product`.
    #[must_use]
    pub fn new(product: ProductDetails) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            price: product.price,
            image_ref: product.image_ref,
            quantity: 1,
        }
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}
