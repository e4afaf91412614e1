//! Cached product catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use brimline_core::{NewProduct, Product, ProductId, ProductPatch};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::api::ApiClient;
use crate::storage::{Persisted, Storage, keys};

/// Persisted catalog state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsState {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Client-side copy of the catalog.
///
/// Writes go to the backend and are followed by a full refetch; local
/// state is not patched in place. View counts are bumped locally only.
#[derive(Debug)]
pub struct ProductsStore {
    state: ProductsState,
    persisted: Persisted<ProductsState>,
    api: ApiClient,
    last_error: Option<String>,
}

impl ProductsStore {
    /// Open the catalog cache, restoring any persisted products.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let persisted = Persisted::new(storage, keys::PRODUCTS);
        let state = persisted.load();
        Self {
            state,
            persisted,
            api,
            last_error: None,
        }
    }

    /// Replace the catalog with the backend's full list.
    #[instrument(skip(self))]
    pub async fn fetch_products(&mut self) -> bool {
        self.last_error = None;
        match self.api.list_products().await {
            Ok(products) => {
                info!(count = products.len(), "Fetched products");
                self.set_products(products);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch products");
                self.last_error = Some("Failed to fetch products".to_owned());
                false
            }
        }
    }

    /// Create a product, then refetch the catalog.
    ///
    /// Returns `false` if the backend rejects the product or does not echo it back.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add_product(&mut self, product: &NewProduct) -> bool {
        self.last_error = None;
        match self.api.create_product(product).await {
            Ok(Some(_)) => {
                self.fetch_products().await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "Failed to add product");
                self.last_error = Some("Failed to add product".to_owned());
                false
            }
        }
    }

    /// Patch a product, then refetch the catalog.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(&mut self, id: &ProductId, patch: &ProductPatch) -> bool {
        self.last_error = None;
        match self.api.update_product(id, patch).await {
            Ok(Some(_)) => {
                self.fetch_products().await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "Failed to update product");
                self.last_error = Some("Failed to update product".to_owned());
                false
            }
        }
    }

    /// Delete a product, then refetch the catalog.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&mut self, id: &ProductId) -> bool {
        self.last_error = None;
        match self.api.delete_product(id).await {
            Ok(()) => {
                self.fetch_products().await;
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to delete product");
                self.last_error = Some("Failed to delete product".to_owned());
                false
            }
        }
    }

    /// Replace the catalog wholesale.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.state.products = products;
        self.persist();
    }

    /// Bump a product's view counter. Never sent to the backend.
    pub fn increment_views(&mut self, id: &ProductId) {
        if let Some(product) = self.state.products.iter_mut().find(|p| &p.id == id) {
            product.analytics.views = product.analytics.views.saturating_add(1);
            self.persist();
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    #[must_use]
    pub fn get_product_by_id(&self, id: &ProductId) -> Option<&Product> {
        self.state.products.iter().find(|p| &p.id == id)
    }

    /// Distinct non-empty brands, sorted.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        self.state
            .products
            .iter()
            .map(|p| p.brand.as_str())
            .filter(|b| !b.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct tags across the catalog, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.state
            .products
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Message from the most recent failed operation, cleared when the next one starts.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn persist(&self) {
        self.persisted.save(&self.state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::storage::MemoryStorage;
    use crate::testing::FakeTransport;

    fn store(fake: &Arc<FakeTransport>) -> ProductsStore {
        ProductsStore::new(fake.client(), Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_fetch_replaces_catalog() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/products",
            json!([{ "id": "cap-1", "name": "Field Cap", "price": 24, "brand": "Brimline", "tags": ["wool"] }]),
        );
        let mut products = store(&fake);
        products.set_products(vec![Product::new("old", "Old", Decimal::ONE)]);

        assert!(products.fetch_products().await);
        assert_eq!(products.products().len(), 1);
        assert!(products.get_product_by_id(&ProductId::new("old")).is_none());
        assert_eq!(products.brands(), vec!["Brimline"]);
        assert_eq!(products.tags(), vec!["wool"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error_and_keeps_cache() {
        let fake = FakeTransport::new();
        fake.on_status(Method::Get, "/products", 500);
        let mut products = store(&fake);
        products.set_products(vec![Product::new("cap-1", "Cap", Decimal::ONE)]);

        assert!(!products.fetch_products().await);
        assert_eq!(products.last_error(), Some("Failed to fetch products"));
        assert_eq!(products.products().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_refetch_catalog() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            "/products",
            json!({ "id": "cap-2", "name": "Trucker", "price": 18 }),
        );
        fake.on(
            Method::Get,
            "/products",
            json!([{ "id": "cap-2", "name": "Trucker", "price": 18 }]),
        );
        let mut products = store(&fake);

        let new = NewProduct::new("Trucker", "Brimline", Decimal::new(18, 0), Vec::new());
        assert!(products.add_product(&new).await);
        assert_eq!(products.products()[0].id.as_str(), "cap-2");

        assert!(products.delete_product(&ProductId::new("cap-2")).await);
        assert_eq!(fake.requests_to(Method::Get, "/products").len(), 2);
        assert!(products.products().is_empty());
    }

    #[tokio::test]
    async fn test_increment_views_is_local() {
        let fake = FakeTransport::new();
        let mut products = store(&fake);
        let mut cap = Product::new("cap-1", "Cap", Decimal::ONE);
        cap.analytics.views = 100;
        products.set_products(vec![cap]);

        let id = ProductId::new("cap-1");
        assert!(!products.get_product_by_id(&id).unwrap().is_popular());
        products.increment_views(&id);
        assert!(products.get_product_by_id(&id).unwrap().is_popular());
        assert!(fake.requests().is_empty());
    }
}
