//! Brimline storefront client.
//!
//! Client-side state for the Brimline headwear shop: a cart with optimistic
//! local lines, a product catalog cache, order history and the login
//! session, all persisted between runs and backed by the shop's REST API.
//!
//! - [`stores`] hold the state and expose the storefront operations.
//! - [`api`] is the typed REST client the stores call.
//! - [`sync`] mirrors cart changes to the backend in the background.
//! - [`routes`] decides which pages a session may see.
//! - [`state::Storefront`] wires everything together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod storage;
pub mod stores;
pub mod sync;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{Error, Result};
pub use state::Storefront;
