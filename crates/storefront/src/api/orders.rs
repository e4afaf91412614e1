//! Order endpoints.

use brimline_core::{NewOrder, Order, OrderId, OrderStats, OrderStatus, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints, list_or_empty};

/// What `POST /orders` returns. Only the id is relied upon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct CreatedOrder {
    #[serde(default)]
    pub id: Option<OrderId>,
}

brimline_core::record_keys!(CreatedOrder, "id" <- "_id");

impl ApiClient {
    /// `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the order.
    #[instrument(skip(self, order), fields(total = %order.total, lines = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder, ApiError> {
        let body = serde_json::to_value(order)?;
        self.execute_or_default(ApiRequest::new(Method::Post, endpoints::ORDERS).body(body))
            .await
    }

    /// `GET /orders` (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not an order list.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let value: Value = self.get(endpoints::ORDERS.to_owned()).await?;
        list_or_empty(value)
    }

    /// `GET /orders/user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not an order list.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn user_orders(&self, user: &UserId) -> Result<Vec<Order>, ApiError> {
        let value: Value = self
            .get(endpoints::scoped(endpoints::ORDERS, "user", user.as_str()))
            .await?;
        list_or_empty(value)
    }

    /// `GET /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get(endpoints::item(endpoints::ORDERS, id.as_str()))
            .await
    }

    /// `PATCH /orders/{id}/status`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the transition.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::new(
            Method::Patch,
            endpoints::item_action(endpoints::ORDERS, id.as_str(), "status"),
        )
        .body(json!({ "status": status }));
        self.execute_unit(request).await
    }

    /// `PATCH /orders/{id}` with arbitrary fields.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, updates), fields(order_id = %id))]
    pub async fn update_order(&self, id: &OrderId, updates: &Value) -> Result<Order, ApiError> {
        self.patch(endpoints::item(endpoints::ORDERS, id.as_str()), updates)
            .await
    }

    /// `DELETE /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the delete.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::ORDERS, id.as_str()))
            .await
    }

    /// `GET /orders/stats`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a stats object.
    #[instrument(skip(self))]
    pub async fn order_stats(&self) -> Result<OrderStats, ApiError> {
        self.execute_or_default(ApiRequest::new(
            Method::Get,
            format!("{}/stats", endpoints::ORDERS),
        ))
        .await
    }
}
