//! Shopper cart state manager.
//!
//! [`CartManager`] owns one shopper's ordered list of line items. Every
//! mutation runs under a single async mutex, validates against the local list
//! and (for add and update) against live stock, then persists the complete
//! new list before swapping it in. A rejected operation changes nothing, in
//! memory or on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketcart_storefront::cart::CartManager;
//! use rocketcart_storefront::inventory::HttpInventory;
//! use rocketcart_storefront::store::FileStore;
//!
//! let inventory = HttpInventory::new(&config.inventory)?;
//! let store = FileStore::new(&config.store_dir);
//! let cart = CartManager::open(inventory, store, &config.storage_key).await;
//!
//! let mut notices = cart.subscribe();
//! cart.add_product(ProductId::new(42)).await?;
//! cart.update_product_amount(ProductId::new(42), 3).await?;
//! ```

mod notice;
mod summary;

pub use notice::{CartNotice, NOTICE_CAPACITY};
pub use summary::{CartSummary, SummaryLine};

use std::collections::HashSet;
use std::sync::Arc;

use rocketcart_core::{LineItem, ProductId};
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::error::{CartError, CartOperation, Result};
use crate::inventory::InventoryService;
use crate::store::CartStore;

/// What a successful cart operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The new list is in memory and persisted.
    Committed,
    /// A guard turned the request into a no-op; nothing was written.
    Unchanged,
}

// =============================================================================
// CartManager
// =============================================================================

/// Handle to one shopper's cart.
///
/// Cheap to clone; clones share the same cart. Construct once per session and
/// hand it to whatever needs the cart.
pub struct CartManager<I, S> {
    inner: Arc<CartManagerInner<I, S>>,
}

struct CartManagerInner<I, S> {
    inventory: I,
    store: S,
    storage_key: String,
    /// Authoritative list; held for the whole of each mutation.
    items: Mutex<Vec<LineItem>>,
    /// Last committed list, readable without waiting on `items`.
    snapshot: watch::Sender<Vec<LineItem>>,
    notices: broadcast::Sender<CartNotice>,
}

impl<I, S> Clone for CartManager<I, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, S> std::fmt::Debug for CartManager<I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("storage_key", &self.inner.storage_key)
            .field("items", &*self.inner.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

impl<I: InventoryService, S: CartStore> CartManager<I, S> {
    /// Open the cart saved under `storage_key`.
    ///
    /// A missing, unreadable or unparseable blob yields an empty cart. A blob
    /// that parses but breaks the cart invariants is repaired: zero-quantity
    /// lines are dropped and only the first line per product is kept.
    #[instrument(skip(inventory, store, storage_key))]
    pub async fn open(inventory: I, store: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let items = hydrate(&store, &storage_key).await;
        info!(key = %storage_key, lines = items.len(), "Cart opened");

        let (snapshot, _) = watch::channel(items.clone());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            inner: Arc::new(CartManagerInner {
                inventory,
                store,
                storage_key,
                items: Mutex::new(items),
                snapshot,
                notices,
            }),
        }
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// Current cart contents in display order.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.inner.snapshot.borrow().clone()
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.inner
            .snapshot
            .borrow()
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
    }

    /// Totals for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::new(&self.inner.snapshot.borrow())
    }

    /// Receiver that observes every committed list.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<LineItem>> {
        self.inner.snapshot.subscribe()
    }

    /// Receiver for shopper-facing failure notices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartNotice> {
        self.inner.notices.subscribe()
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// The inventory service backing this cart.
    #[must_use]
    pub fn inventory(&self) -> &I {
        &self.inner.inventory
    }

    /// The store backing this cart.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product_id`.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its
    /// quantity plus one, so stock is checked for the full new quantity.
    ///
    /// # Errors
    ///
    /// `OutOfStock` if nothing is available, `OperationFailed` if the
    /// inventory or the store fails. The cart is unchanged on error.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartOutcome> {
        let mut items = self.inner.items.lock().await;
        let result = self.add_locked(&mut items, product_id).await;
        self.report(CartOperation::Add, result)
    }

    /// Remove the line for `product_id`. No stock check is made.
    ///
    /// # Errors
    ///
    /// `NotFound` if the product is not in the cart, `OperationFailed` if the
    /// store fails. The cart is unchanged on error.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartOutcome> {
        let mut items = self.inner.items.lock().await;
        let result = self.remove_locked(&mut items, product_id).await;
        self.report(CartOperation::Remove, result)
    }

    /// Set the quantity of `product_id` to `amount`.
    ///
    /// An `amount` below 1 is ignored: the line is kept and nothing is
    /// written. Use [`remove_product`](Self::remove_product) to drop a line.
    ///
    /// # Errors
    ///
    /// `NotFound` if the product is not in the cart, `OutOfStock` if stock is
    /// below `amount`, `OperationFailed` if the inventory or the store fails.
    /// The cart is unchanged on error.
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<CartOutcome> {
        let mut items = self.inner.items.lock().await;
        let result = self.update_locked(&mut items, product_id, amount).await;
        self.report(CartOperation::Update, result)
    }

    async fn add_locked(
        &self,
        items: &mut Vec<LineItem>,
        product_id: ProductId,
    ) -> Result<CartOutcome> {
        let existing = items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity);

        if let Some(quantity) = existing {
            debug!(quantity, "Product already in cart, incrementing");
            return self
                .update_locked(items, product_id, i64::from(quantity) + 1)
                .await;
        }

        let inventory = &self.inner.inventory;
        let stock = inventory
            .stock(product_id)
            .await
            .map_err(|e| CartError::failed(CartOperation::Add, product_id, e))?;

        if !stock.covers(1) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: 1,
                available: stock.available,
            });
        }

        let product = inventory
            .product(product_id)
            .await
            .map_err(|e| CartError::failed(CartOperation::Add, product_id, e))?;

        let mut next = items.clone();
        next.push(LineItem {
            product_id,
            ..LineItem::new(product)
        });
        self.commit(items, next, CartOperation::Add, product_id)
            .await
    }

    async fn remove_locked(
        &self,
        items: &mut Vec<LineItem>,
        product_id: ProductId,
    ) -> Result<CartOutcome> {
        let Some(index) = items.iter().position(|item| item.product_id == product_id) else {
            return Err(CartError::NotFound {
                operation: CartOperation::Remove,
                product_id,
            });
        };

        let mut next = items.clone();
        next.remove(index);
        self.commit(items, next, CartOperation::Remove, product_id)
            .await
    }

    async fn update_locked(
        &self,
        items: &mut Vec<LineItem>,
        product_id: ProductId,
        amount: i64,
    ) -> Result<CartOutcome> {
        if amount < 1 {
            debug!(amount, "Ignoring quantity below 1");
            return Ok(CartOutcome::Unchanged);
        }

        let Some(index) = items.iter().position(|item| item.product_id == product_id) else {
            return Err(CartError::NotFound {
                operation: CartOperation::Update,
                product_id,
            });
        };

        let mut next = items.clone();
        let Some(line) = next.get_mut(index) else {
            return Ok(CartOutcome::Unchanged);
        };
        if line.quantity == 0 {
            return Ok(CartOutcome::Unchanged);
        }

        let stock = self
            .inner
            .inventory
            .stock(product_id)
            .await
            .map_err(|e| CartError::failed(CartOperation::Update, product_id, e))?;

        let out_of_stock = || CartError::OutOfStock {
            product_id,
            requested: amount,
            available: stock.available,
        };
        let quantity = u32::try_from(amount).map_err(|_| out_of_stock())?;
        if !stock.covers(quantity) {
            return Err(out_of_stock());
        }
        line.quantity = quantity;

        self.commit(items, next, CartOperation::Update, product_id)
            .await
    }

    /// Persist `next`, then make it the current list.
    async fn commit(
        &self,
        items: &mut Vec<LineItem>,
        next: Vec<LineItem>,
        operation: CartOperation,
        product_id: ProductId,
    ) -> Result<CartOutcome> {
        let blob = serde_json::to_string(&next)
            .map_err(|e| CartError::failed(operation, product_id, e))?;

        self.inner
            .store
            .save(&self.inner.storage_key, &blob)
            .await
            .map_err(|e| CartError::failed(operation, product_id, e))?;

        *items = next;
        self.inner.snapshot.send_replace(items.clone());
        Ok(CartOutcome::Committed)
    }

    /// Log the result and notify subscribers of rejections.
    fn report(&self, operation: CartOperation, result: Result<CartOutcome>) -> Result<CartOutcome> {
        match &result {
            Ok(CartOutcome::Committed) => info!(%operation, "Cart updated"),
            Ok(CartOutcome::Unchanged) => debug!(%operation, "Cart unchanged"),
            Err(err) => {
                if matches!(err, CartError::OperationFailed { .. }) {
                    let event_id = sentry::capture_error(err);
                    tracing::error!(
                        error = %err,
                        sentry_event_id = %event_id,
                        "Cart operation failed"
                    );
                } else {
                    warn!(error = %err, "Cart operation rejected");
                }

                // No subscribers is fine
                let _ = self.inner.notices.send(CartNotice::rejected(operation, err));
            }
        }
        result
    }
}

/// Load and repair the saved list.
async fn hydrate<S: CartStore>(store: &S, key: &str) -> Vec<LineItem> {
    let blob = match store.load(key).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read saved cart, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<LineItem>>(&blob) {
        Ok(items) => sanitize(items),
        Err(e) => {
            warn!(error = %e, "Saved cart is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Drop zero-quantity lines and repeated product IDs (first line wins).
fn sanitize(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            if item.quantity == 0 {
                warn!(product_id = %item.product_id, "Dropping saved line with zero quantity");
                false
            } else if !seen.insert(item.product_id) {
                warn!(product_id = %item.product_id, "Dropping duplicate saved line");
                false
            } else {
                true
            }
        })
        .collect()
}
