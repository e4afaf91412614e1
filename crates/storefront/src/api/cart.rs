//! Server-side cart endpoints.
//!
//! The cart store treats these as a mirror of local state; see
//! [`crate::sync`] for how the mutating calls are issued.

use brimline_core::{CartItem, ProductId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints};

const ADD_ITEM: &str = "/cart/add-item";
const REMOVE_ITEM: &str = "/cart/remove-item";

/// The backend's view of a cart. `items` is absent when the backend has no
/// cart for the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Option<Vec<CartItem>>,
}

impl ApiClient {
    /// `GET /cart` for the current session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a cart.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartSnapshot, ApiError> {
        self.execute_or_default(ApiRequest::new(Method::Get, endpoints::CART))
            .await
    }

    /// `GET /cart/user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a cart.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn get_user_cart(&self, user: &UserId) -> Result<CartSnapshot, ApiError> {
        let path = endpoints::scoped(endpoints::CART, "user", user.as_str());
        self.execute_or_default(ApiRequest::new(Method::Get, path))
            .await
    }

    /// `POST /cart/add-item?productId=..&quantity=..`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn add_cart_item(
        &self,
        product: &ProductId,
        quantity: u32,
        idempotency_key: Uuid,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Post, ADD_ITEM)
            .query("productId", product)
            .query("quantity", quantity)
            .body(json!({}))
            .idempotency_key(idempotency_key);
        self.execute_unit(request).await
    }

    /// `DELETE /cart/remove-item?productId=..`.
    ///
    /// The backend removes every line for the product regardless of size or color.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn remove_cart_item(
        &self,
        product: &ProductId,
        idempotency_key: Uuid,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, REMOVE_ITEM)
            .query("productId", product)
            .idempotency_key(idempotency_key);
        self.execute_unit(request).await
    }

    /// `PATCH /cart/{id}` replacing the stored lines.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn patch_cart(&self, cart_id: &str, items: &[CartItem]) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Patch, endpoints::item(endpoints::CART, cart_id))
            .body(json!({ "items": items }));
        self.execute_unit(request).await
    }

    /// `DELETE /cart` for the current session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, idempotency_key: Uuid) -> Result<(), ApiError> {
        self.execute_unit(
            ApiRequest::new(Method::Delete, endpoints::CART).idempotency_key(idempotency_key),
        )
        .await
    }

    /// `DELETE /cart/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn clear_cart_by_id(&self, cart_id: &str) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::CART, cart_id)).await
    }

    /// `POST /cart` with a full replacement for `user`'s cart.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, items), fields(user_id = %user, lines = items.len()))]
    pub async fn replace_cart(&self, user: &UserId, items: &[CartItem]) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Post, endpoints::CART)
            .body(json!({ "userId": user, "items": items }));
        self.execute_unit(request).await
    }
}
