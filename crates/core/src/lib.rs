//! RocketCart Core - Shared cart types.
//!
//! This crate provides the types shared by every RocketCart component:
//! - `storefront` - Cart manager, inventory client and cart stores
//! - `cli` - Command-line front end over the cart manager
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, line items and inventory snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
