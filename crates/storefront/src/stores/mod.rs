//! Client-side state stores.
//!
//! Four independent containers, each owning one persisted key and talking
//! to the backend through a shared [`crate::api::ApiClient`]. Nothing
//! coordinates them: a checkout that creates an order and then clears the
//! cart performs two separate, non-atomic steps.
//!
//! Expected failures never surface as errors. Commands return `bool` or
//! `Option` and record a human-readable `last_error` where the caller may
//! want to show one.

mod auth;
mod cart;
mod orders;
mod products;

pub use auth::{AuthState, AuthStore};
pub use cart::{CartState, CartStore};
pub use orders::{OrderStore, OrdersState};
pub use products::{ProductsState, ProductsStore};
