//! Order history and admin order commands.

use brimline_core::{Order, OrderId, OrderStatus, format_usd};
use brimline_storefront::Storefront;
use brimline_storefront::routes::Route;

use super::{CommandError, require};

/// Print the logged-in user's orders, or every order with `all` (admin).
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &mut Storefront, all: bool) -> Result<(), CommandError> {
    if all {
        require(storefront, Route::Admin)?;
        storefront.orders.fetch_orders().await;
        print_orders(storefront.orders.orders().iter());
        return Ok(());
    }

    require(storefront, Route::Dashboard)?;
    let Some(user) = storefront.auth.user().cloned() else {
        return Err(CommandError::Failed("Not logged in".to_owned()));
    };
    storefront.orders.fetch_user_orders(&user.id).await;
    print_orders(storefront.orders.get_user_orders(&user.email).into_iter());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_orders<'a>(orders: impl Iterator<Item = &'a Order>) {
    let mut any = false;
    for order in orders {
        any = true;
        println!(
            "{:<26} {}  {:<10} {:>3} items  {:>10}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            order.status,
            order.item_count(),
            format_usd(order.total)
        );
    }
    if !any {
        println!("No orders yet.");
    }
}

/// Print one order as on the confirmation page.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &mut Storefront, id: &OrderId) -> Result<(), CommandError> {
    require(storefront, Route::OrderConfirmation(Some(id.clone())))?;

    if storefront.orders.get_order_by_id(id).is_none() {
        match storefront.auth.user().map(|u| u.id.clone()) {
            Some(user_id) if !storefront.auth.is_admin() => {
                storefront.orders.fetch_user_orders(&user_id).await;
            }
            _ => {
                storefront.orders.fetch_orders().await;
            }
        }
    }
    let order = storefront
        .orders
        .get_order_by_id(id)
        .ok_or_else(|| CommandError::NotFound(format!("order {id}")))?;

    println!("Order {} ({})", order.id, order.status);
    println!("  Placed:   {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Customer: {} <{}>", order.customer_info.name, order.customer_info.email);
    println!("  Ship to:  {}", order.customer_info.address);
    for item in &order.items {
        let name = item.product.as_ref().map_or(item.product_id.as_str(), |p| p.name.as_str());
        println!(
            "    {:>3} x {:<28} {:<6} {:<8} {:>10}",
            item.quantity,
            name,
            item.selected_size,
            item.selected_color,
            format_usd(item.line_total())
        );
    }
    println!("  Subtotal: {}", format_usd(order.subtotal));
    println!("  Tax:      {}", format_usd(order.tax));
    println!("  Total:    {}", format_usd(order.total));
    println!("  Paid by:  {}", order.payment_method);
    Ok(())
}

/// Move an order to a new status (admin).
///
/// A delivered or cancelled order is only moved with `force`.
#[allow(clippy::print_stdout)]
pub async fn set_status(
    storefront: &mut Storefront,
    id: &OrderId,
    status: OrderStatus,
    force: bool,
) -> Result<(), CommandError> {
    require(storefront, Route::AdminPanel)?;

    if storefront.orders.get_order_by_id(id).is_none() {
        storefront.orders.fetch_orders().await;
    }
    let current = storefront.orders.get_order_by_id(id).map(|o| o.status);
    check_transition(current, status, force)?;

    if !storefront.orders.update_order_status(id, status).await {
        return Err(CommandError::Failed(
            storefront
                .orders
                .last_error()
                .unwrap_or("Failed to update order status")
                .to_owned(),
        ));
    }
    println!("Order {id} is now {status}.");
    Ok(())
}

/// Print aggregate order figures (admin).
#[allow(clippy::print_stdout)]
pub async fn stats(storefront: &mut Storefront) -> Result<(), CommandError> {
    require(storefront, Route::AdminPanel)?;

    let stats = storefront
        .orders
        .fetch_stats()
        .await
        .ok_or_else(|| CommandError::Failed("Failed to fetch order stats".to_owned()))?;
    println!("Orders:    {}", stats.total_orders);
    println!("Pending:   {}", stats.pending_orders);
    println!("Completed: {}", stats.completed_orders);
    println!("Revenue:   {}", format_usd(stats.total_revenue));
    Ok(())
}

fn check_transition(
    current: Option<OrderStatus>,
    next: OrderStatus,
    force: bool,
) -> Result<(), CommandError> {
    match current {
        Some(current) if current.is_terminal() && current != next && !force => {
            Err(CommandError::InvalidArgument(format!(
                "order is already {current}; pass --force to move it to {next}"
            )))
        }
        _ => Ok(()),
    }
}
