//! Integration tests for the Brimline storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! # Scripted backend (no network)
//! cargo test -p brimline-integration-tests
//!
//! # Against a running backend
//! BRIMLINE_API_URL=http://localhost:7000/api \
//!     cargo test -p brimline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shopping_flow` - Browse, cart and checkout across stores
//! - `sessions` - Login, logout and route guards
//! - `persistence` - State surviving a restart
//! - `live_backend` - Smoke tests against a real server (ignored by default)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use brimline_core::{Product, ProductVariant};
use brimline_storefront::Storefront;
use brimline_storefront::api::{Method, Transport};
use brimline_storefront::config::StorefrontConfig;
use brimline_storefront::storage::{FileStorage, Storage};
use brimline_storefront::testing::{FakeTransport, memory_storage};
use rust_decimal::Decimal;
use serde_json::{Value, json};

/// A storefront over in-memory storage and a scripted backend.
pub struct TestContext {
    pub storefront: Storefront,
    pub backend: Arc<FakeTransport>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(memory_storage())
    }

    /// Persist state under `dir`, as a real run would.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_storage(Arc::new(FileStorage::open(dir).unwrap()))
    }

    fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let backend = FakeTransport::new();
        let config = StorefrontConfig {
            payment_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        let transport: Arc<dyn Transport> = Arc::clone(&backend) as Arc<dyn Transport>;
        Self {
            storefront: Storefront::with_transport(config, storage, transport),
            backend,
        }
    }

    /// Script a successful login for a user with `role`.
    pub fn script_login(&self, role: &str) -> &Self {
        self.backend.on(
            Method::Post,
            "/auth/login",
            json!({
                "user": { "_id": "u-1", "username": "Kim", "email": "kim@brimline.shop", "role": role },
                "token": "tok-1",
            }),
        );
        self
    }

    /// Script the catalog returned by `GET /products`.
    pub fn script_catalog(&self, products: &[Value]) -> &Self {
        self.backend
            .on(Method::Get, "/products", Value::Array(products.to_vec()));
        self
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A product with one in-stock variant.
#[must_use]
pub fn hat(id: &str, name: &str, price: Decimal, color: &str, size: &str) -> Product {
    Product::new(id, name, price).with_variant(ProductVariant::new(color, size, 10))
}

/// Backend JSON for a product, as `GET /products` returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: &str, brand: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "brand": brand,
        "variants": [{ "color": "Black", "size": "M", "stock": 4 }],
        "tags": ["wool"],
        "analytics": { "views": 3 },
    })
}
