//! Browsing queries over a product list.

use core::fmt;
use core::str::FromStr;

use brimline_core::{CategoryId, Product};
use rust_decimal::Decimal;

/// Ordering for a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep the backend's order.
    #[default]
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
    Name,
    MostViewed,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Name,
        Self::MostViewed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLowToHigh => "price-low",
            Self::PriceHighToLow => "price-high",
            Self::Name => "name",
            Self::MostViewed => "popular",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| format!("invalid sort order: {s}"))
    }
}

/// Listing filter. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub brand: Option<String>,
    /// Only products with variant stock left.
    pub in_stock: bool,
    /// Products must carry all of these tags.
    pub tags: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub const fn in_stock(mut self) -> Self {
        self.in_stock = true;
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub const fn price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = (!query.trim().is_empty()).then_some(query);
        self
    }

    /// Whether `product` passes every set criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self
            .category
            .as_ref()
            .is_some_and(|category| product.category_id.as_ref() != Some(category))
        {
            return false;
        }
        if self.brand.as_ref().is_some_and(|brand| &product.brand != brand) {
            return false;
        }
        if self.in_stock && product.total_stock() == 0 {
            return false;
        }
        if !self.tags.iter().all(|tag| product.tags.contains(tag)) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min)
            || self.max_price.is_some_and(|max| product.price > max)
        {
            return false;
        }
        if let Some(query) = &self.search {
            return product
                .name
                .to_lowercase()
                .contains(&query.trim().to_lowercase());
        }
        true
    }
}

/// Filter and sort `products` for display.
///
/// Sorting is stable, so ties keep the backend's order.
#[must_use]
pub fn browse<'a>(products: &'a [Product], filter: &ProductFilter, sort: SortOrder) -> Vec<&'a Product> {
    let mut listed: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();
    match sort {
        SortOrder::Newest => {}
        SortOrder::PriceLowToHigh => listed.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceHighToLow => listed.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Name => listed.sort_by_key(|p| p.name.to_lowercase()),
        SortOrder::MostViewed => listed.sort_by(|a, b| b.analytics.views.cmp(&a.analytics.views)),
    }
    listed
}

#[cfg(test)]
mod tests {
    use brimline_core::ProductVariant;

    use super::*;

    fn catalog() -> Vec<Product> {
        let mut field = Product::new("cap-1", "Field Cap", Decimal::new(24, 0))
            .with_variant(ProductVariant::new("Olive", "M", 3));
        field.brand = "Brimline".into();
        field.tags = vec!["wool".into(), "winter".into()];
        field.category_id = Some(CategoryId::new("caps"));
        field.analytics.views = 40;

        let mut trucker = Product::new("cap-2", "trucker mesh", Decimal::new(18, 0))
            .with_variant(ProductVariant::new("Red", "L", 0));
        trucker.brand = "Roadside".into();
        trucker.tags = vec!["summer".into()];
        trucker.analytics.views = 250;

        let mut beanie = Product::new("hat-3", "Ridge Beanie", Decimal::new(30, 0))
            .with_variant(ProductVariant::new("Navy", "OS", 9));
        beanie.brand = "Brimline".into();
        beanie.tags = vec!["wool".into()];
        beanie.category_id = Some(CategoryId::new("beanies"));

        vec![field, trucker, beanie]
    }

    fn ids(listed: &[&Product]) -> Vec<String> {
        listed.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_default_filter_keeps_backend_order() {
        let products = catalog();
        let listed = browse(&products, &ProductFilter::default(), SortOrder::Newest);
        assert_eq!(ids(&listed), vec!["cap-1", "cap-2", "hat-3"]);
    }

    #[test]
    fn test_filters_combine() {
        let products = catalog();
        let filter = ProductFilter::default().brand("Brimline").tag("wool").in_stock();
        let listed = browse(&products, &filter, SortOrder::PriceHighToLow);
        assert_eq!(ids(&listed), vec!["hat-3", "cap-1"]);

        let filter = ProductFilter::default().category("caps");
        assert_eq!(ids(&browse(&products, &filter, SortOrder::Newest)), vec!["cap-1"]);
    }

    #[test]
    fn test_in_stock_uses_variant_stock() {
        let products = catalog();
        let listed = browse(&products, &ProductFilter::default().in_stock(), SortOrder::Newest);
        assert!(!ids(&listed).contains(&"cap-2".to_string()));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let products = catalog();
        let filter = ProductFilter::default()
            .price_range(Some(Decimal::new(18, 0)), Some(Decimal::new(24, 0)));
        let listed = browse(&products, &filter, SortOrder::PriceLowToHigh);
        assert_eq!(ids(&listed), vec!["cap-2", "cap-1"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let products = catalog();
        let filter = ProductFilter::default().search("TRUCK");
        assert_eq!(ids(&browse(&products, &filter, SortOrder::Newest)), vec!["cap-2"]);

        let blank = ProductFilter::default().search("   ");
        assert!(blank.search.is_none());
    }

    #[test]
    fn test_sort_by_name_and_views() {
        let products = catalog();
        let by_name = browse(&products, &ProductFilter::default(), SortOrder::Name);
        assert_eq!(ids(&by_name), vec!["cap-1", "hat-3", "cap-2"]);

        let by_views = browse(&products, &ProductFilter::default(), SortOrder::MostViewed);
        assert_eq!(ids(&by_views)[0], "cap-2");
    }

    #[test]
    fn test_sort_order_parse() {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>(), Ok(order));
        }
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
