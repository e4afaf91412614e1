//! Cart commands.
//!
//! Every change is applied to the local cart first; the backend mirror runs
//! in the background and the command waits for it before exiting.
//!
//! # Usage
//!
//! ```bash
//! brim cart add cap-1 --size M --color Olive --quantity 2
//! brim cart set cap-1 --size M --color Olive --quantity 1
//! brim cart show
//! brim cart sync
//! ```

use brimline_core::{CartLineKey, ProductId, format_usd};
use brimline_storefront::Storefront;
use brimline_storefront::checkout::CheckoutSummary;
use brimline_storefront::routes::Route;

use super::{CommandError, require, settle};

/// Print the cart with totals.
#[allow(clippy::print_stdout)]
pub fn show(storefront: &Storefront) -> Result<(), CommandError> {
    require(storefront, Route::Cart)?;

    let cart = &storefront.cart;
    if cart.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for item in cart.items() {
        let name = item.product.as_ref().map_or("(unknown product)", |p| p.name.as_str());
        println!(
            "{:>3} x {:<28} {:<6} {:<8} {:>10}",
            item.quantity,
            name,
            item.selected_size,
            item.selected_color,
            format_usd(item.line_total())
        );
    }

    let summary = CheckoutSummary::for_cart(cart);
    println!("Items:    {}", cart.item_count());
    println!("Subtotal: {}", format_usd(summary.subtotal));
    println!("Tax (8%): {}", format_usd(summary.tax));
    println!("Total:    {}", format_usd(cart.total()));
    Ok(())
}

/// Add a size/color combination to the cart.
#[allow(clippy::print_stdout)]
pub async fn add(
    storefront: &mut Storefront,
    id: &ProductId,
    size: &str,
    color: &str,
    quantity: u32,
) -> Result<(), CommandError> {
    require(storefront, Route::ProductDetail(id.clone()))?;

    if storefront.products.get_product_by_id(id).is_none() {
        storefront.products.fetch_products().await;
    }
    let product = storefront
        .products
        .get_product_by_id(id)
        .ok_or_else(|| CommandError::NotFound(format!("product {id}")))?;

    if product.variant(size, color).is_none() {
        tracing::warn!(product_id = %id, size, color, "No such variant; adding anyway");
    }

    let pending = storefront.cart.add_to_cart(product, size, color, quantity);
    settle(pending).await;
    println!("Cart now holds {} items.", storefront.cart.item_count());
    Ok(())
}

/// Remove a line.
#[allow(clippy::print_stdout)]
pub async fn remove(storefront: &mut Storefront, key: &CartLineKey) -> Result<(), CommandError> {
    if storefront.cart.line(key).is_none() {
        return Err(CommandError::NotFound(format!("cart line {key}")));
    }
    settle(storefront.cart.remove_from_cart(key)).await;
    println!("Removed {key}.");
    Ok(())
}

/// Set a line's quantity; zero removes it.
#[allow(clippy::print_stdout)]
pub async fn set(
    storefront: &mut Storefront,
    key: &CartLineKey,
    quantity: u32,
) -> Result<(), CommandError> {
    if storefront.cart.line(key).is_none() {
        return Err(CommandError::NotFound(format!("cart line {key}")));
    }
    settle(storefront.cart.update_quantity(key, quantity)).await;
    println!("Cart now holds {} items.", storefront.cart.item_count());
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub async fn clear(storefront: &mut Storefront) -> Result<(), CommandError> {
    settle(storefront.cart.clear_cart()).await;
    println!("Cart cleared.");
    Ok(())
}

/// Replace the local cart with the backend's copy, if it has one.
#[allow(clippy::print_stdout)]
pub async fn sync(storefront: &mut Storefront) -> Result<(), CommandError> {
    if storefront.cart.sync_with_server().await {
        println!("Cart replaced with {} lines from the server.", storefront.cart.items().len());
    } else {
        println!("Local cart kept.");
    }
    Ok(())
}
