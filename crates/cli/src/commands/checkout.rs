//! Checkout command.

use brimline_core::format_usd;
use brimline_storefront::Storefront;
use brimline_storefront::checkout::{CheckoutForm, CheckoutSummary};
use brimline_storefront::routes::Route;

use super::{CommandError, require, settle};

/// Fill missing form fields from the logged-in user's profile.
#[must_use]
pub fn prefill(storefront: &Storefront, mut form: CheckoutForm) -> CheckoutForm {
    let Some(user) = storefront.auth.user() else {
        return form;
    };
    if form.name.trim().is_empty() {
        form.name.clone_from(&user.name);
    }
    if form.email.trim().is_empty() {
        form.email.clone_from(&user.email);
    }
    if form.phone.trim().is_empty() {
        form.phone = user.phone.clone().unwrap_or_default();
    }
    if form.address.trim().is_empty() {
        form.address = user.address.clone().unwrap_or_default();
    }
    form
}

/// Pay for the cart and place the order.
#[allow(clippy::print_stdout)]
pub async fn run(storefront: &mut Storefront, form: CheckoutForm) -> Result<(), CommandError> {
    require(storefront, Route::Checkout)?;

    let form = prefill(storefront, form);
    let summary = CheckoutSummary::for_cart(&storefront.cart);
    println!("Subtotal: {}", format_usd(summary.subtotal));
    println!("Tax:      {}", format_usd(summary.tax));
    println!("Shipping: {}", format_usd(summary.shipping));
    println!("Total:    {}", format_usd(summary.total));
    println!("Processing payment...");

    let placed = storefront.checkout(&form).await?;
    settle(placed.cart_sync).await;

    println!("Order placed: {}", placed.order_id);
    println!("See it with: brim orders show {}", placed.order_id);
    Ok(())
}
