//! Shopper-facing failure notices.

use rocketcart_core::ProductId;

use crate::error::{CartError, CartOperation};

/// Notices buffered per subscriber before the oldest are dropped.
pub const NOTICE_CAPACITY: usize = 16;

/// A message to show the shopper after a rejected cart operation.
///
/// `message` is always one of the fixed strings in [`crate::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartNotice {
    /// Operation the shopper asked for.
    pub operation: CartOperation,
    /// Product the operation targeted.
    pub product_id: ProductId,
    /// Text to display.
    pub message: &'static str,
}

impl CartNotice {
    pub(crate) const fn rejected(operation: CartOperation, err: &CartError) -> Self {
        Self {
            operation,
            product_id: err.product_id(),
            message: err.user_message(),
        }
    }
}
