//! CLI commands.

pub mod cart;

use rocketcart_storefront::{
    CartConfig, CartError, CartManager, FileStore, HttpInventory, InventoryError,
};
use thiserror::Error;

/// Cart wired to the inventory API and the on-disk store.
pub type Cart = CartManager<HttpInventory, FileStore>;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The inventory client could not be built.
    #[error("Inventory client error: {0}")]
    Inventory(#[from] InventoryError),

    /// The cart rejected the operation.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the shopper's cart as configured.
///
/// # Errors
///
/// Returns an error if the inventory client cannot be built.
pub async fn open_cart(config: &CartConfig) -> Result<Cart, CommandError> {
    let inventory = HttpInventory::new(&config.inventory)?;
    let store = FileStore::new(&config.store_dir);

    tracing::debug!(
        store_dir = %store.dir().display(),
        key = %config.storage_key,
        "Opening cart"
    );

    Ok(CartManager::open(inventory, store, &config.storage_key).await)
}
