//! RocketCart Storefront library.
//!
//! Manages one shopper's cart: add, remove and quantity changes validated
//! against the inventory API and persisted after every change.
//!
//! # Modules
//!
//! - [`cart`] - `CartManager`, notices and cart summaries
//! - [`inventory`] - Inventory service trait and HTTP client
//! - [`store`] - Durable cart stores
//! - [`config`] - Environment configuration
//! - [`error`] - Cart error taxonomy and shopper-facing messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod inventory;
pub mod store;

pub use cart::{CartManager, CartNotice, CartOutcome, CartSummary};
pub use config::CartConfig;
pub use error::{CartError, CartOperation};
pub use inventory::{HttpInventory, InventoryError, InventoryService};
pub use store::{CartStore, FileStore, MemoryStore, StoreError};
