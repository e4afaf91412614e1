//! Brimline Core - Shared domain types.
//!
//! This crate provides the types exchanged with the Brimline REST backend and
//! shared by the storefront stores and the `brim` CLI:
//! - `storefront` - Client-side stores, REST client, checkout and route guards
//! - `cli` - Operator command-line tool driving the stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no persistence. Field names serialize in `camelCase` to match the
//! backend's JSON.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, cart lines, orders, users, reviews,
//!   notifications and money formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
