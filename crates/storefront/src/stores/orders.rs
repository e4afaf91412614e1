//! Order history.

use std::sync::Arc;

use brimline_core::{NewOrder, Order, OrderId, OrderStats, OrderStatus, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::api::{ApiClient, CreatedOrder};
use crate::storage::{Persisted, Storage, keys};

/// Persisted order state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersState {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Locally known orders.
///
/// Lookups never hit the backend; they only see what `create_order`,
/// `fetch_orders` or `fetch_user_orders` have put here.
#[derive(Debug)]
pub struct OrderStore {
    state: OrdersState,
    persisted: Persisted<OrdersState>,
    api: ApiClient,
    last_error: Option<String>,
}

impl OrderStore {
    /// Open the order history, restoring any persisted orders.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let persisted = Persisted::new(storage, keys::ORDERS);
        let state = persisted.load();
        Self {
            state,
            persisted,
            api,
            last_error: None,
        }
    }

    /// Submit an order and record it locally as `Pending`.
    ///
    /// Returns the backend-assigned id, or `None` if the call failed or the
    /// backend returned no id. Local state only changes when an id comes back.
    #[instrument(skip(self, order), fields(total = %order.total))]
    pub async fn create_order(&mut self, order: NewOrder) -> Option<OrderId> {
        self.last_error = None;
        match self.api.create_order(&order).await {
            Ok(CreatedOrder { id: Some(id) }) => {
                info!(order_id = %id, "Order created");
                self.state
                    .orders
                    .push(Order::from_new(id.clone(), order, Utc::now()));
                self.persist();
                Some(id)
            }
            Ok(CreatedOrder { id: None }) => None,
            Err(e) => {
                error!(error = %e, "Failed to create order");
                self.last_error = Some("Failed to create order".to_owned());
                None
            }
        }
    }

    /// Replace local orders with every order (admin).
    #[instrument(skip(self))]
    pub async fn fetch_orders(&mut self) -> bool {
        self.last_error = None;
        match self.api.list_orders().await {
            Ok(orders) => {
                self.replace(orders);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch orders");
                self.last_error = Some("Failed to fetch orders".to_owned());
                false
            }
        }
    }

    /// Replace local orders with `user`'s orders.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn fetch_user_orders(&mut self, user: &UserId) -> bool {
        self.last_error = None;
        match self.api.user_orders(user).await {
            Ok(orders) => {
                self.replace(orders);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch user orders");
                self.last_error = Some("Failed to fetch user orders".to_owned());
                false
            }
        }
    }

    /// Change an order's status on the backend, then locally.
    ///
    /// Local state is left alone if the backend call fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&mut self, id: &OrderId, status: OrderStatus) -> bool {
        self.last_error = None;
        if let Err(e) = self.api.update_order_status(id, status).await {
            error!(error = %e, "Failed to update order status");
            self.last_error = Some("Failed to update order status".to_owned());
            return false;
        }

        if let Some(order) = self.state.orders.iter_mut().find(|o| &o.id == id) {
            order.status = status;
            self.persist();
        }
        true
    }

    /// Store-wide figures (admin). Not cached.
    #[instrument(skip(self))]
    pub async fn fetch_stats(&mut self) -> Option<OrderStats> {
        self.last_error = None;
        match self.api.order_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!(error = %e, "Failed to fetch order stats");
                self.last_error = Some("Failed to fetch order stats".to_owned());
                None
            }
        }
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.state.orders
    }

    #[must_use]
    pub fn get_order_by_id(&self, id: &OrderId) -> Option<&Order> {
        self.state.orders.iter().find(|o| &o.id == id)
    }

    /// Orders whose customer email matches exactly.
    #[must_use]
    pub fn get_user_orders(&self, email: &str) -> Vec<&Order> {
        self.state
            .orders
            .iter()
            .filter(|o| o.customer_info.email == email)
            .collect()
    }

    /// Message from the most recent failed operation, cleared when the next one starts.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn replace(&mut self, orders: Vec<Order>) {
        info!(count = orders.len(), "Fetched orders");
        self.state.orders = orders;
        self.persist();
    }

    fn persist(&self) {
        self.persisted.save(&self.state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brimline_core::CustomerInfo;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::storage::MemoryStorage;
    use crate::testing::FakeTransport;

    fn new_order(email: &str) -> NewOrder {
        NewOrder {
            items: Vec::new(),
            subtotal: Decimal::new(50, 0),
            tax: Decimal::new(4, 0),
            total: Decimal::new(54, 0),
            customer_info: CustomerInfo {
                name: "Kim".into(),
                email: email.into(),
                phone: "555-0100".into(),
                address: "1 Brim St".into(),
            },
            payment_method: "Credit Card".into(),
        }
    }

    fn store(fake: &Arc<FakeTransport>) -> OrderStore {
        OrderStore::new(fake.client(), Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_create_appends_pending_order() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/orders", json!({ "id": "o-1" }));
        let mut orders = store(&fake);

        let id = orders.create_order(new_order("kim@brimline.shop")).await;

        assert_eq!(id, Some(OrderId::new("o-1")));
        assert_eq!(orders.orders().len(), 1);
        let order = orders.get_order_by_id(&OrderId::new("o-1")).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(orders.get_user_orders("kim@brimline.shop").len(), 1);
        assert!(orders.get_user_orders("other@brimline.shop").is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_leaves_state_unchanged() {
        let fake = FakeTransport::new();
        fake.on_status(Method::Post, "/orders", 500);
        let mut orders = store(&fake);

        assert!(orders.create_order(new_order("kim@brimline.shop")).await.is_none());
        assert!(orders.orders().is_empty());
        assert_eq!(orders.last_error(), Some("Failed to create order"));
    }

    #[tokio::test]
    async fn test_create_without_id_returns_none() {
        let fake = FakeTransport::new();
        let mut orders = store(&fake);
        assert!(orders.create_order(new_order("kim@brimline.shop")).await.is_none());
        assert!(orders.orders().is_empty());
        assert!(orders.last_error().is_none());
    }

    #[tokio::test]
    async fn test_status_update_requires_backend_success() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/orders", json!({ "id": "o-1" }));
        fake.on_status(Method::Patch, "/orders/o-1/status", 403);
        let mut orders = store(&fake);
        let id = orders
            .create_order(new_order("kim@brimline.shop"))
            .await
            .unwrap();

        assert!(!orders.update_order_status(&id, OrderStatus::Shipped).await);
        assert_eq!(orders.get_order_by_id(&id).unwrap().status, OrderStatus::Pending);

        assert!(orders.update_order_status(&id, OrderStatus::Shipped).await);
        assert_eq!(orders.get_order_by_id(&id).unwrap().status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_fetch_user_orders_replaces_state() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/orders/user/u-1",
            json!([{ "_id": "o-7", "status": "delivered", "customerInfo": { "name": "Kim", "email": "kim@brimline.shop", "phone": "", "address": "" } }]),
        );
        let mut orders = store(&fake);

        assert!(orders.fetch_user_orders(&UserId::new("u-1")).await);
        assert_eq!(orders.orders()[0].status, OrderStatus::Delivered);
        assert_eq!(orders.get_user_orders("kim@brimline.shop").len(), 1);
    }
}
