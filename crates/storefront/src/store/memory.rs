//! In-process cart store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{CartStore, StoreError};

/// Blobs kept in a map for the life of the process.
///
/// Counts successful writes and can be switched into a failing mode, which
/// makes it useful for exercising the cart's commit path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `blob` under `key`.
    #[must_use]
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.into());
        store
    }

    /// Current blob under `key`, without going through the async trait.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail (`true`) or succeed again (`false`).
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

impl CartStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes rejected".to_string()));
        }

        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        assert!(store.load("cart").await.unwrap().is_none());

        store.save("cart", "[]").await.unwrap();
        assert_eq!(store.load("cart").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_rejected_write_keeps_previous_blob() {
        let store = MemoryStore::with_blob("cart", "old");
        store.reject_writes(true);

        let err = store.save("cart", "new").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.get("cart").as_deref(), Some("old"));
        assert_eq!(store.writes(), 0);
    }
}
