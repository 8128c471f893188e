//! Core types for RocketCart.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::ProductId;
pub use line_item::LineItem;
pub use price::Price;
pub use product::{ProductDetails, Stock};
