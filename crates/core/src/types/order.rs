//! Orders created from a cart snapshot at checkout.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::{OrderId, UserId};

/// Order lifecycle.
///
/// `Pending -> Processing -> Shipped -> Delivered`, or `Cancelled` from any
/// non-delivered state. The client does not enforce transitions; the backend
/// is the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders do not move again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Contact and shipping details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Payload for creating an order: everything but the server id, timestamp and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub customer_info: CustomerInfo,
    pub payment_method: String,
}

/// A placed order. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub payment_method: String,
}

crate::record_keys!(Order, "id" <- "_id");

impl Order {
    /// Materialize a freshly created order: server id, client timestamp, `Pending`.
    #[must_use]
    pub fn from_new(id: OrderId, new: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: None,
            items: new.items,
            subtotal: new.subtotal,
            tax: new.tax,
            total: new.total,
            status: OrderStatus::Pending,
            created_at,
            customer_info: new.customer_info,
            payment_method: new.payment_method,
        }
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Aggregate order figures for the admin overview.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Decimal,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub completed_orders: u64,
}
