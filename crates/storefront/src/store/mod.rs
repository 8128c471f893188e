//! Durable key-value storage for serialized carts.
//!
//! The cart is saved whole under one fixed key on every mutation, so stores
//! only need `load` and `save` of opaque blobs.
//!
//! - [`FileStore`] - one file per key in a directory, atomically replaced
//! - [`MemoryStore`] - process-local map, for tests and embedders

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use thiserror::Error;

/// Errors that can occur when reading or writing a saved cart.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A durable blob store that survives process restarts.
pub trait CartStore: Send + Sync {
    /// Read the blob saved under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the blob saved under `key`.
    fn save(&self, key: &str, blob: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
