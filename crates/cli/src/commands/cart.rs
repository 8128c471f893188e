//! Cart commands.
//!
//! Mutating commands print the resulting cart on success. On rejection they
//! print the shopper-facing notice to stderr and fail.

use std::io::{self, Write};

use rocketcart_core::ProductId;
use rocketcart_storefront::cart::{CartNotice, CartOutcome, CartSummary};
use rocketcart_storefront::error::Result as CartResult;
use tokio::sync::broadcast;

use super::{Cart, CommandError};

/// Print the cart.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn show(cart: &Cart) -> Result<(), CommandError> {
    render(&mut io::stdout().lock(), &cart.summary())?;
    Ok(())
}

/// Add one unit of `product_id`.
///
/// # Errors
///
/// Returns an error if the cart rejects the addition.
pub async fn add(cart: &Cart, product_id: ProductId) -> Result<(), CommandError> {
    let mut notices = cart.subscribe();
    let result = cart.add_product(product_id).await;
    finish(cart, &mut notices, result)
}

/// Remove `product_id`.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot be saved.
pub async fn remove(cart: &Cart, product_id: ProductId) -> Result<(), CommandError> {
    let mut notices = cart.subscribe();
    let result = cart.remove_product(product_id).await;
    finish(cart, &mut notices, result)
}

/// Set the quantity of `product_id`.
///
/// # Errors
///
/// Returns an error if the cart rejects the change.
pub async fn update(cart: &Cart, product_id: ProductId, amount: i64) -> Result<(), CommandError> {
    let mut notices = cart.subscribe();
    let result = cart.update_product_amount(product_id, amount).await;
    finish(cart, &mut notices, result)
}

fn finish(
    cart: &Cart,
    notices: &mut broadcast::Receiver<CartNotice>,
    result: CartResult<CartOutcome>,
) -> Result<(), CommandError> {
    let mut stderr = io::stderr().lock();
    while let Ok(notice) = notices.try_recv() {
        writeln!(stderr, "{}", notice.message)?;
    }

    if matches!(result, Ok(CartOutcome::Unchanged)) {
        writeln!(stderr, "Cart unchanged")?;
    }

    result?;
    show(cart)
}

/// Write `summary` as a plain-text table.
fn render(out: &mut impl Write, summary: &CartSummary) -> io::Result<()> {
    if summary.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for line in &summary.lines {
        writeln!(
            out,
            "{:>6}  {:<30}  {:>3} x {:>10}  {:>10}",
            line.product_id.as_i32(),
            line.name,
            line.quantity,
            line.unit_price.display(),
            line.line_total.display(),
        )?;
    }

    let noun = if summary.item_count == 1 { "item" } else { "items" };
    writeln!(
        out,
        "Total: {} ({} {noun})",
        summary.total.display(),
        summary.item_count
    )
}
