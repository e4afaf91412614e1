//! Shopping cart: optimistic local lines mirrored to the backend.

use std::sync::Arc;

use brimline_core::{CartItem, CartLineKey, Product, tax_on};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use crate::api::ApiClient;
use crate::storage::{Persisted, Storage, keys};
use crate::sync::{PendingSync, SyncCommand, SyncDispatcher, SyncEvent};

/// Persisted cart state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub is_open: bool,
}

/// The shopping cart.
///
/// Local state is authoritative: every mutation is applied and persisted
/// before any backend call is made, and a failed mirror call never undoes
/// it. Totals are recomputed from the current lines on every call.
#[derive(Debug)]
pub struct CartStore {
    state: CartState,
    persisted: Persisted<CartState>,
    api: ApiClient,
    sync: SyncDispatcher,
}

impl CartStore {
    /// Open the cart, restoring any persisted lines.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let persisted = Persisted::new(storage, keys::CART);
        let state = persisted.load();
        Self {
            state,
            persisted,
            sync: SyncDispatcher::new(api.clone()),
            api,
        }
    }

    /// Add `quantity` of a size/color combination.
    ///
    /// An existing line with the same key has its quantity increased; stock
    /// is not checked. A zero quantity changes nothing.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(
        &mut self,
        product: &Product,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> PendingSync {
        if quantity == 0 {
            return PendingSync::local();
        }

        let key = CartLineKey::new(product.id.clone(), size, color);
        match self.state.items.iter_mut().find(|item| item.matches(&key)) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self
                .state
                .items
                .push(CartItem::new(product, size, color, quantity)),
        }
        self.persist();

        self.sync
            .dispatch(SyncCommand::add_item(product.id.clone(), quantity))
    }

    /// Remove the line identified by `key`.
    ///
    /// The backend removal is keyed by product id only.
    #[instrument(skip(self), fields(line = %key))]
    pub fn remove_from_cart(&mut self, key: &CartLineKey) -> PendingSync {
        self.state.items.retain(|item| !item.matches(key));
        self.persist();

        self.sync
            .dispatch(SyncCommand::remove_item(key.product_id.clone()))
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// Quantity changes are not mirrored to the backend.
    #[instrument(skip(self), fields(line = %key))]
    pub fn update_quantity(&mut self, key: &CartLineKey, quantity: u32) -> PendingSync {
        if quantity == 0 {
            return self.remove_from_cart(key);
        }

        if let Some(line) = self.state.items.iter_mut().find(|item| item.matches(key)) {
            line.quantity = quantity;
            self.persist();
        }
        PendingSync::local()
    }

    /// Flip the cart drawer open/closed. Returns the new state.
    pub fn toggle_cart(&mut self) -> bool {
        self.state.is_open = !self.state.is_open;
        self.persist();
        self.state.is_open
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> PendingSync {
        self.state.items.clear();
        self.persist();
        self.sync.dispatch(SyncCommand::clear())
    }

    /// Replace local lines with the backend's cart when it has one.
    ///
    /// Returns `true` when local lines were replaced. A response without
    /// `items`, or a failed fetch, leaves local state untouched.
    #[instrument(skip(self))]
    pub async fn sync_with_server(&mut self) -> bool {
        match self.api.get_cart().await {
            Ok(snapshot) => match snapshot.items {
                Some(items) => {
                    info!(lines = items.len(), "Cart replaced from server");
                    self.state.items = items;
                    self.persist();
                    true
                }
                None => false,
            },
            Err(e) => {
                error!(error = %e, "Failed to sync cart with server");
                false
            }
        }
    }

    /// Outcomes of every mirror call made by this store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sync.subscribe()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    #[must_use]
    pub fn line(&self, key: &CartLineKey) -> Option<&CartItem> {
        self.state.items.iter().find(|item| item.matches(key))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state
            .items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Sum of line totals at snapshot prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.state.items.iter().map(CartItem::line_total).sum()
    }

    /// Flat 8% of the subtotal.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        tax_on(self.subtotal())
    }

    /// Subtotal plus tax. Shipping is added by the caller.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let subtotal = self.subtotal();
        subtotal + tax_on(subtotal)
    }

    fn persist(&self) {
        self.persisted.save(&self.state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brimline_core::ProductVariant;

    use super::*;
    use crate::api::Method;
    use crate::storage::MemoryStorage;
    use crate::sync::SyncOutcome;
    use crate::testing::FakeTransport;

    fn cap(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Cap {id}"), Decimal::new(cents, 2))
            .with_variant(ProductVariant::new("Black", "M", 5))
    }

    fn store(fake: &Arc<FakeTransport>) -> CartStore {
        CartStore::new(fake.client(), Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_same_key_accumulates_quantity() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let a = cap("cap-1", 2000);

        cart.add_to_cart(&a, "M", "Black", 1).outcome().await;
        cart.add_to_cart(&a, "M", "Black", 3).outcome().await;

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(fake.requests_to(Method::Post, "/cart/add-item").len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_variants_are_distinct_lines() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let a = cap("cap-1", 2000);

        drop(cart.add_to_cart(&a, "M", "Black", 1));
        drop(cart.add_to_cart(&a, "L", "Black", 1));
        drop(cart.add_to_cart(&a, "M", "Red", 1));

        assert_eq!(cart.items().len(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[tokio::test]
    async fn test_any_add_sequence_keeps_one_line_per_key() {
        use std::collections::HashMap;

        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let products = [cap("cap-1", 2450), cap("snap-back-07", 1999), cap("fedora", 5000)];
        let sizes = ["S", "M", "L"];
        let colors = ["Black", "Olive"];
        let mut expected: HashMap<CartLineKey, u32> = HashMap::new();

        for step in 0..60_usize {
            let product = &products[step % products.len()];
            let size = sizes[(step / 2) % sizes.len()];
            let color = colors[(step / 5) % colors.len()];
            let quantity = u32::try_from(step % 4 + 1).unwrap();

            drop(cart.add_to_cart(product, size, color, quantity));
            *expected
                .entry(CartLineKey::new(product.id.as_str(), size, color))
                .or_default() += quantity;

            assert_eq!(cart.items().len(), expected.len(), "step {step}");
            for (key, quantity) in &expected {
                assert_eq!(cart.line(key).unwrap().quantity, *quantity, "step {step}");
            }
            let subtotal = cart.subtotal();
            assert_eq!(cart.total(), subtotal + subtotal * Decimal::new(8, 2), "step {step}");
        }

        let expected_subtotal: Decimal = expected
            .iter()
            .map(|(key, quantity)| {
                let product = products.iter().find(|p| p.id == key.product_id).unwrap();
                product.price * Decimal::from(*quantity)
            })
            .sum();
        assert_eq!(cart.subtotal(), expected_subtotal);
        assert_eq!(cart.item_count(), expected.values().map(|q| u64::from(*q)).sum::<u64>());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_is_noop() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let outcome = cart
            .add_to_cart(&cap("cap-1", 2000), "M", "Black", 0)
            .outcome()
            .await;
        assert_eq!(outcome, SyncOutcome::LocalOnly);
        assert!(cart.is_empty());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let a = cap("snap-back-07", 2000);
        cart.add_to_cart(&a, "M", "Black", 2).outcome().await;

        let key = CartLineKey::new("snap-back-07", "M", "Black");
        cart.update_quantity(&key, 0).outcome().await;

        assert!(cart.line(&key).is_none());
        let removal = &fake.requests_to(Method::Delete, "/cart/remove-item")[0];
        assert_eq!(
            removal.query,
            vec![("productId".into(), "snap-back-07".into())]
        );
    }

    #[tokio::test]
    async fn test_update_quantity_is_local_only() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        let a = cap("cap-1", 2000);
        cart.add_to_cart(&a, "M", "Black", 1).outcome().await;

        let key = CartLineKey::new("cap-1", "M", "Black");
        let outcome = cart.update_quantity(&key, 5).outcome().await;

        assert_eq!(outcome, SyncOutcome::LocalOnly);
        assert_eq!(cart.line(&key).unwrap().quantity, 5);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_mirror_keeps_local_line() {
        let fake = FakeTransport::new();
        fake.fail_unrouted();
        let mut cart = store(&fake);
        let mut events = cart.subscribe();

        let outcome = cart
            .add_to_cart(&cap("cap-1", 2000), "M", "Black", 1)
            .outcome()
            .await;

        assert!(outcome.is_failed());
        assert_eq!(cart.items().len(), 1);
        assert!(events.recv().await.unwrap().outcome.is_failed());
    }

    #[tokio::test]
    async fn test_totals_follow_current_lines() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        drop(cart.add_to_cart(&cap("a", 2000), "M", "Black", 1));
        drop(cart.add_to_cart(&cap("b", 1500), "L", "Red", 2));

        assert_eq!(cart.subtotal(), Decimal::new(50, 0));
        assert_eq!(cart.tax(), Decimal::new(4, 0));
        assert_eq!(cart.total(), Decimal::new(54, 0));

        cart.update_quantity(&CartLineKey::new("b", "L", "Red"), 1)
            .outcome()
            .await;
        assert_eq!(cart.subtotal(), Decimal::new(35, 0));
        assert_eq!(cart.total(), cart.subtotal() + cart.subtotal() * Decimal::new(8, 2));
    }

    #[tokio::test]
    async fn test_sync_with_server_replaces_only_when_items_present() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/cart", serde_json::json!({ "userId": "u-1" }));
        fake.on(
            Method::Get,
            "/cart",
            serde_json::json!({ "items": [
                { "productId": "cap-9", "quantity": 2, "selectedSize": "S", "selectedColor": "Navy" }
            ] }),
        );
        let mut cart = store(&fake);
        drop(cart.add_to_cart(&cap("cap-1", 2000), "M", "Black", 1));

        assert!(!cart.sync_with_server().await);
        assert_eq!(cart.items()[0].product_id.as_str(), "cap-1");

        assert!(cart.sync_with_server().await);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id.as_str(), "cap-9");
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let fake = FakeTransport::new();
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let mut cart = CartStore::new(fake.client(), Arc::clone(&storage));
        drop(cart.add_to_cart(&cap("cap-1", 2000), "M", "Black", 2));
        cart.toggle_cart();

        let reopened = CartStore::new(fake.client(), storage);
        assert_eq!(reopened.item_count(), 2);
        assert!(reopened.is_open());
    }

    #[tokio::test]
    async fn test_clear_cart_empties_and_mirrors() {
        let fake = FakeTransport::new();
        let mut cart = store(&fake);
        drop(cart.add_to_cart(&cap("cap-1", 2000), "M", "Black", 2));

        let outcome = cart.clear_cart().outcome().await;
        assert!(outcome.is_synced());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
