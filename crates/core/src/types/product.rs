//! Inventory service payloads.
//!
//! These mirror the JSON shapes served by the inventory API:
//! `GET /products/{id}` and `GET /stock/{id}`.

use serde::{Deserialize, Serialize};

use super::{ProductId, Price};

/// Product metadata as reported by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    #[serde(rename = "title")]
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL or asset reference.
    #[serde(rename = "image")]
    pub image_ref: String,
}

/// Point-in-time stock snapshot for one product.
///
/// Never stored; consulted within a single cart operation and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product ID.
    pub id: ProductId,
    /// Units available. May be zero or negative when oversold.
    #[serde(rename = "amount")]
    pub available: i64,
}

impl Stock {
    /// Whether at least `quantity` units can be sold.
    #[must_use]
    pub fn covers(&self, quantity: u32) -> bool {
        self.available >= i64::from(quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_uses_api_field_names() {
        let json = r#"{"id":42,"title":"Shoe","price":100,"image":"x"}"#;
        let product: ProductDetails = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(42));
        assert_eq!(product.name, "Shoe");
        assert_eq!(product.price, Price::from_cents(10_000));
        assert_eq!(product.image_ref, "x");
    }

    #[test]
    fn test_stock_covers() {
        let stock: Stock = serde_json::from_str(r#"{"id":1,"amount":3}"#).unwrap();
        assert!(stock.covers(3));
        assert!(!stock.covers(4));

        let oversold = Stock {
            id: ProductId::new(1),
            available: -2,
        };
        assert!(!oversold.covers(1));
    }
}
