//! The assembled storefront: every store over one client and one storage.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::checkout::{self, CheckoutError, CheckoutForm, PlacedOrder};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::routes::{self, Access, Route};
use crate::storage::{FileStorage, Storage};
use crate::stores::{AuthStore, CartStore, OrderStore, ProductsStore};

/// All client-side stores, sharing one backend client and one storage.
///
/// The stores are independent fields so callers can borrow several at once,
/// for example the cart and orders during checkout.
#[derive(Debug)]
pub struct Storefront {
    pub cart: CartStore,
    pub products: ProductsStore,
    pub orders: OrderStore,
    pub auth: AuthStore,
    config: StorefrontConfig,
    api: ApiClient,
}

impl Storefront {
    /// Open the storefront against the configured backend, restoring state
    /// persisted under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.state_dir)?);
        let transport = HttpTransport::new(&config, Arc::clone(&storage))?;
        info!(
            api_url = %config.api_url,
            state_dir = %config.state_dir.display(),
            "Storefront opened"
        );
        Ok(Self::with_transport(config, storage, Arc::new(transport)))
    }

    /// Assemble the storefront over an explicit storage and transport.
    #[must_use]
    pub fn with_transport(
        config: StorefrontConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let api = ApiClient::new(transport);
        Self {
            cart: CartStore::new(api.clone(), Arc::clone(&storage)),
            products: ProductsStore::new(api.clone(), Arc::clone(&storage)),
            orders: OrderStore::new(api.clone(), Arc::clone(&storage)),
            auth: AuthStore::new(api.clone(), storage),
            config,
            api,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The backend client, for endpoints no store wraps.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.config.state_dir
    }

    /// Guard `route` against the current session.
    #[must_use]
    pub fn guard(&self, route: &Route) -> Access {
        routes::guard(route, self.auth.state())
    }

    /// Check out the current cart using the configured payment delay.
    ///
    /// # Errors
    ///
    /// See [`checkout::place_order`].
    pub async fn checkout(&mut self, form: &CheckoutForm) -> std::result::Result<PlacedOrder, CheckoutError> {
        let delay = self.config.payment_delay;
        checkout::place_order(&mut self.cart, &mut self.orders, form, delay).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use brimline_core::{Product, ProductVariant};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::testing::{FakeTransport, memory_storage};

    fn storefront(fake: &Arc<FakeTransport>) -> Storefront {
        let config = StorefrontConfig {
            payment_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        let transport: Arc<dyn Transport> = Arc::clone(fake) as Arc<dyn Transport>;
        Storefront::with_transport(config, memory_storage(), transport)
    }

    #[test]
    fn test_open_creates_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            state_dir: dir.path().join("state"),
            ..StorefrontConfig::default()
        };
        let storefront = Storefront::open(config).unwrap();
        assert!(storefront.state_dir().is_dir());
        assert!(storefront.cart.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_empties_cart() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/orders", json!({ "_id": "o-1" }));
        let mut storefront = storefront(&fake);

        let cap = Product::new("cap-1", "Field Cap", Decimal::new(25, 0))
            .with_variant(ProductVariant::new("Olive", "M", 4));
        drop(storefront.cart.add_to_cart(&cap, "M", "Olive", 2));

        let form = CheckoutForm {
            name: "Kim".into(),
            email: "kim@brimline.shop".into(),
            phone: "555-0100".into(),
            address: "1 Brim St".into(),
        };
        let placed = storefront.checkout(&form).await.unwrap();

        assert_eq!(placed.order_id.as_str(), "o-1");
        // $50 subtotal + $4 tax + $5.99 shipping (free only above $50)
        assert_eq!(placed.summary.total, Decimal::new(5999, 2));
        assert!(storefront.cart.is_empty());
        assert_eq!(storefront.orders.orders().len(), 1);
        placed.cart_sync.outcome().await;
    }

    #[test]
    fn test_guard_uses_session() {
        let fake = FakeTransport::new();
        let storefront = storefront(&fake);
        assert_eq!(storefront.guard(&Route::Checkout), Access::Redirect("/login"));
        assert_eq!(storefront.guard(&Route::Products), Access::Render);
    }
}
