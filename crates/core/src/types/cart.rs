//! Cart lines and their composite identity.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// Identity of a cart line: the same product in a different size or color is
/// a different line.
///
/// This replaces the `productId-size-color` string form; the product id is
/// carried as its own field so ids containing `-` stay intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl CartLineKey {
    /// Build a key.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        size: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.into(),
            color: color.into(),
        }
    }
}

/// Renders the legacy compound form (`productId-size-color`) for display.
impl fmt::Display for CartLineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.product_id, self.size, self.color)
    }
}

/// A line in the shopping cart.
///
/// `product` is a point-in-time copy taken when the line was created; it is
/// not refreshed when the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: String,
    #[serde(default)]
    pub selected_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl CartItem {
    /// Create a line embedding a snapshot of `product`.
    #[must_use]
    pub fn new(product: &Product, size: &str, color: &str, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            selected_size: size.to_owned(),
            selected_color: color.to_owned(),
            product: Some(product.clone()),
        }
    }

    /// The line's composite key.
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey {
            product_id: self.product_id.clone(),
            size: self.selected_size.clone(),
            color: self.selected_color.clone(),
        }
    }

    /// Whether this line is identified by `key`.
    #[must_use]
    pub fn matches(&self, key: &CartLineKey) -> bool {
        self.product_id == key.product_id
            && self.selected_size == key.size
            && self.selected_color == key.color
    }

    /// Unit price from the embedded snapshot (zero when the snapshot is missing).
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.as_ref().map_or(Decimal::ZERO, |p| p.price)
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_matches_legacy_form() {
        let key = CartLineKey::new("cap-1", "M", "Black");
        assert_eq!(key.to_string(), "cap-1-M-Black");
    }

    #[test]
    fn test_hyphenated_product_id_survives_key() {
        let product = Product::new("snap-back-07", "Snapback", Decimal::new(20, 0));
        let item = CartItem::new(&product, "M", "Black", 1);
        assert_eq!(item.key().product_id.as_str(), "snap-back-07");
    }

    #[test]
    fn test_matches_requires_all_three_parts() {
        let product = Product::new("cap-1", "Snapback", Decimal::new(20, 0));
        let item = CartItem::new(&product, "M", "Black", 1);
        assert!(item.matches(&CartLineKey::new("cap-1", "M", "Black")));
        assert!(!item.matches(&CartLineKey::new("cap-1", "L", "Black")));
        assert!(!item.matches(&CartLineKey::new("cap-1", "M", "Red")));
    }

    #[test]
    fn test_line_total_without_snapshot_is_zero() {
        let item = CartItem {
            product_id: ProductId::new("cap-9"),
            quantity: 3,
            selected_size: "M".into(),
            selected_color: "Black".into(),
            product: None,
        };
        assert_eq!(item.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_multiplies_quantity() {
        let product = Product::new("cap-2", "Trucker", Decimal::new(1500, 2));
        let item = CartItem::new(&product, "L", "Red", 2);
        assert_eq!(item.line_total(), Decimal::new(30, 0));
    }
}
