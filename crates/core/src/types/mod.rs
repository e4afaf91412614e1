//! Core types for Brimline.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod notification;
pub mod order;
pub mod price;
pub mod product;
pub mod record;
pub mod review;
pub mod user;

pub use cart::{CartItem, CartLineKey};
pub use id::*;
pub use notification::{NewNotification, Notification, NotificationKind, NotificationStats};
pub use order::{CustomerInfo, NewOrder, Order, OrderStats, OrderStatus};
pub use price::{TAX_RATE, format_usd, tax_on};
pub use product::{
    Category, NewProduct, POPULAR_VIEWS_THRESHOLD, Product, ProductAnalytics, ProductDiscount,
    ProductPatch, ProductSeo, ProductVariant,
};
pub use review::{NewReview, Review, ReviewStats, ReviewStatus};
pub use user::{Address, NewUser, ProfilePatch, Role, User, UserStatus};
