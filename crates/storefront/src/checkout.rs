//! Checkout: form validation, shipping and order placement.
//!
//! Payment is simulated with a fixed delay; no gateway is involved.

use std::time::Duration;

use brimline_core::{CustomerInfo, NewOrder, OrderId};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::stores::{CartStore, OrderStore};
use crate::sync::PendingSync;

/// Payment method recorded on every order.
pub const PAYMENT_METHOD: &str = "Credit Card";

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_OVER: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// Errors that stop a checkout before or during order placement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// A required form field is blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Email is not of the form `local@domain`.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// There is nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// The backend did not accept the order.
    #[error("Order was not created: {0}")]
    OrderRejected(String),
}

/// Customer details as entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CheckoutForm {
    /// Check required fields and return trimmed customer details.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for the first blank field, or `InvalidEmail`.
    pub fn validate(&self) -> Result<CustomerInfo, CheckoutError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(CheckoutError::InvalidEmail(email.to_owned())),
        }

        Ok(CustomerInfo {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            address: address.to_owned(),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(value)
}

/// Shipping for a given cart subtotal.
#[must_use]
pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_OVER {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    }
}

/// Amounts shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    /// Cart total plus shipping.
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Price the cart as it stands now.
    #[must_use]
    pub fn for_cart(cart: &CartStore) -> Self {
        let subtotal = cart.subtotal();
        let shipping = shipping_for(subtotal);
        Self {
            subtotal,
            tax: cart.tax(),
            shipping,
            total: cart.total() + shipping,
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub summary: CheckoutSummary,
    /// The background clear of the server-side cart.
    pub cart_sync: PendingSync,
}

/// An order priced and captured from the cart when the customer confirms.
///
/// Later cart changes do not alter a captured draft.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    order: NewOrder,
    summary: CheckoutSummary,
}

impl CheckoutDraft {
    /// Validate `form` and snapshot the cart lines and totals.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid form or an empty cart.
    pub fn capture(cart: &CartStore, form: &CheckoutForm) -> Result<Self, CheckoutError> {
        let customer_info = form.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = CheckoutSummary::for_cart(cart);
        Ok(Self {
            order: NewOrder {
                items: cart.items().to_vec(),
                subtotal: summary.subtotal,
                tax: summary.tax,
                total: summary.total,
                customer_info,
                payment_method: PAYMENT_METHOD.to_owned(),
            },
            summary,
        })
    }

    #[must_use]
    pub const fn summary(&self) -> &CheckoutSummary {
        &self.summary
    }

    #[must_use]
    pub const fn order(&self) -> &NewOrder {
        &self.order
    }

    /// Wait out the simulated payment, then create the captured order.
    ///
    /// # Errors
    ///
    /// Returns `OrderRejected` when the order store reports no id.
    pub async fn submit(
        self,
        orders: &mut OrderStore,
        payment_delay: Duration,
    ) -> Result<(OrderId, CheckoutSummary), CheckoutError> {
        tokio::time::sleep(payment_delay).await;

        let Some(order_id) = orders.create_order(self.order).await else {
            let reason = orders
                .last_error()
                .unwrap_or("backend returned no order id")
                .to_owned();
            warn!(reason = %reason, "Checkout failed; cart kept");
            return Err(CheckoutError::OrderRejected(reason));
        };
        Ok((order_id, self.summary))
    }
}

/// Capture the cart, wait out the simulated payment, create the order, then
/// clear the cart.
///
/// The cart is only cleared once the order has an id. Order creation and
/// the cart clear are separate steps; an interruption between them leaves
/// the order recorded with the cart intact.
///
/// # Errors
///
/// Returns an error for an invalid form, an empty cart, or when the order
/// store reports no id.
#[instrument(skip_all)]
pub async fn place_order(
    cart: &mut CartStore,
    orders: &mut OrderStore,
    form: &CheckoutForm,
    payment_delay: Duration,
) -> Result<PlacedOrder, CheckoutError> {
    let draft = CheckoutDraft::capture(cart, form)?;
    let (order_id, summary) = draft.submit(orders, payment_delay).await?;

    info!(order_id = %order_id, total = %summary.total, "Order placed");
    let cart_sync = cart.clear_cart();

    Ok(PlacedOrder {
        order_id,
        summary,
        cart_sync,
    })
}
