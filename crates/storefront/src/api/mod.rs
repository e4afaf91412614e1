//! REST client for the Brimline backend.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam between typed endpoint calls and the wire.
//!   [`HttpTransport`] speaks HTTP via `reqwest`; tests script responses with
//!   an in-memory transport instead.
//! - [`ApiClient`] is a cheaply cloneable facade with one method per backend
//!   endpoint, grouped by resource in the submodules.
//! - The backend is the source of truth; the client keeps no cache of its own.
//!   Caching and optimistic state live in [`crate::stores`].
//!
//! There is no retry, timeout or request de-duplication at this layer: a call
//! resolves or fails exactly once.

mod auth;
mod cart;
pub mod endpoints;
mod http;
mod notifications;
mod orders;
mod products;
mod reviews;
mod users;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use auth::{AuthResponse, Credentials};
pub use cart::CartSnapshot;
pub use http::HttpTransport;
pub use orders::CreatedOrder;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure not covered above.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status of a backend rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP verbs used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// A backend request, independent of the wire implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Sent as `Idempotency-Key` so the backend can drop replays.
    pub idempotency_key: Option<Uuid>,
}

impl ApiRequest {
    /// A request with no query, body or idempotency key.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an idempotency key.
    #[must_use]
    pub const fn idempotency_key(mut self, key: Uuid) -> Self {
        self.idempotency_key = Some(key);
        self
    }
}

/// Sends [`ApiRequest`]s and returns the decoded JSON body.
///
/// Implementations return `Value::Null` for empty bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Typed client for every backend endpoint.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Wrap a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a prepared request and decode the response.
    async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.transport.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a prepared request, decoding an empty body as `T::default()`.
    async fn execute_or_default<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let value = self.transport.send(request).await?;
        if value.is_null() {
            return Ok(T::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Send a prepared request and discard the response body.
    async fn execute_unit(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.transport.send(request).await.map(drop)
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T, ApiError> {
        self.execute(ApiRequest::new(Method::Get, path)).await
    }

    async fn post<B, T>(&self, path: String, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(ApiRequest::new(Method::Post, path).body(body))
            .await
    }

    async fn patch<B, T>(&self, path: String, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(ApiRequest::new(Method::Patch, path).body(body))
            .await
    }

    async fn delete(&self, path: String) -> Result<(), ApiError> {
        self.execute_unit(ApiRequest::new(Method::Delete, path))
            .await
    }
}

/// Deserialize a JSON list where the backend may answer `null` for "none".
fn list_or_empty<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let key = Uuid::new_v4();
        let request = ApiRequest::new(Method::Post, "/cart/add-item")
            .query("productId", "cap-1")
            .query("quantity", 2)
            .idempotency_key(key);

        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.query,
            vec![
                ("productId".to_string(), "cap-1".to_string()),
                ("quantity".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(request.idempotency_key, Some(key));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Status {
            status: 404,
            message: "missing".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::Transport("down".into()).status(), None);
    }

    #[test]
    fn test_list_or_empty_accepts_null() {
        let list: Vec<u32> = list_or_empty(Value::Null).unwrap();
        assert!(list.is_empty());
        let list: Vec<u32> = list_or_empty(serde_json::json!([1, 2])).unwrap();
        assert_eq!(list, vec![1, 2]);
    }
}
