//! Cart totals for display.

use rocketcart_core::{LineItem, Price, ProductId};

/// One line of a [`CartSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub product_id: ProductId,
    pub name: String,
    pub image_ref: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Cart contents with per-line and overall totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<SummaryLine>,
    pub total: Price,
    /// Sum of quantities across all lines.
    pub item_count: u32,
}

impl CartSummary {
    /// Summarize `items` in cart order.
    #[must_use]
    pub fn new(items: &[LineItem]) -> Self {
        let lines: Vec<SummaryLine> = items.iter().map(SummaryLine::from).collect();
        let total: Price = lines.iter().map(|line| line.line_total).sum();
        let item_count = lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity));

        Self {
            lines,
            total,
            item_count,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&LineItem> for SummaryLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image_ref: item.image_ref.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: item.line_total(),
        }
    }
}
