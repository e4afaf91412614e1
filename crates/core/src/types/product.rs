//! Catalog types: products, variants, analytics and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};

/// View count above which a product earns the "Popular" badge.
pub const POPULAR_VIEWS_THRESHOLD: u64 = 100;

/// A purchasable (color, size) configuration with its own stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub stock: u32,
}

impl ProductVariant {
    /// Create a variant.
    #[must_use]
    pub fn new(color: impl Into<String>, size: impl Into<String>, stock: u32) -> Self {
        Self {
            color: color.into(),
            size: size.into(),
            stock,
        }
    }
}

/// Engagement counters.
///
/// `views` is bumped locally by the products store; everything else is
/// maintained by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalytics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub ratings_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchased_at: Option<DateTime<Utc>>,
}

/// Percentage discount, optionally time-boxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscount {
    pub percent: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Search engine metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeo {
    pub slug: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
}

/// A catalog product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Legacy single-image field kept for older catalog entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Aggregate stock as reported by the backend.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<ProductDiscount>,
    #[serde(default)]
    pub analytics: ProductAnalytics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<ProductSeo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

crate::record_keys!(Product, "id" <- "_id");

const fn default_available() -> bool {
    true
}

impl Product {
    /// Create an available product with no variants, images or analytics.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            brand: String::new(),
            category_id: None,
            images: Vec::new(),
            image_url: None,
            stock: 0,
            variants: Vec::new(),
            is_available: true,
            tags: Vec::new(),
            discount: None,
            analytics: ProductAnalytics::default(),
            seo: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Append a variant (builder style).
    #[must_use]
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Total sellable stock: the sum of all variant stocks.
    #[must_use]
    pub fn total_stock(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.stock)).sum()
    }

    /// A product can be bought when it is listed and at least one variant has stock.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.is_available && self.variants.iter().any(|v| v.stock > 0)
    }

    /// Look up the variant for a size/color combination.
    #[must_use]
    pub fn variant(&self, size: &str, color: &str) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.size == size && v.color == color)
    }

    /// Distinct sizes in variant order.
    #[must_use]
    pub fn sizes(&self) -> Vec<&str> {
        let mut sizes: Vec<&str> = Vec::new();
        for v in &self.variants {
            if !sizes.contains(&v.size.as_str()) {
                sizes.push(&v.size);
            }
        }
        sizes
    }

    /// Distinct colors in variant order.
    #[must_use]
    pub fn colors(&self) -> Vec<&str> {
        let mut colors: Vec<&str> = Vec::new();
        for v in &self.variants {
            if !colors.contains(&v.color.as_str()) {
                colors.push(&v.color);
            }
        }
        colors
    }

    /// Price after applying the discount percentage, if any.
    ///
    /// The discount applies regardless of `valid_until`; use
    /// [`Self::is_on_sale`] to decide whether to show it.
    #[must_use]
    pub fn discounted_price(&self) -> Decimal {
        self.discount.as_ref().map_or(self.price, |d| {
            self.price * (Decimal::ONE - d.percent / Decimal::ONE_HUNDRED)
        })
    }

    /// Whether a discount is currently running.
    ///
    /// A discount without an expiry is not advertised.
    #[must_use]
    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        self.discount
            .as_ref()
            .and_then(|d| d.valid_until)
            .is_some_and(|until| until > now)
    }

    /// Whether the product earns the "Popular" badge.
    #[must_use]
    pub const fn is_popular(&self) -> bool {
        self.analytics.views > POPULAR_VIEWS_THRESHOLD
    }
}

/// Payload for creating a product (admin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock: u32,
    pub variants: Vec<ProductVariant>,
    pub tags: Vec<String>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<ProductDiscount>,
    pub analytics: ProductAnalytics,
}

impl NewProduct {
    /// Create a listing with zeroed analytics; `stock` is derived from variants.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        price: Decimal,
        variants: Vec<ProductVariant>,
    ) -> Self {
        let stock = variants.iter().map(|v| v.stock).sum();
        Self {
            name: name.into(),
            description: String::new(),
            price,
            brand: brand.into(),
            category_id: None,
            images: Vec::new(),
            image_url: None,
            stock,
            variants,
            tags: Vec::new(),
            is_available: true,
            discount: None,
            analytics: ProductAnalytics::default(),
        }
    }
}

/// Partial product update (admin). Only `Some` fields are sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<ProductVariant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<ProductDiscount>,
}

impl ProductPatch {
    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<CategoryId>,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

crate::record_keys!(Category, "id" <- "_id");
