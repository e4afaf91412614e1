//! `reqwest`-backed [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use super::{ApiError, ApiRequest, Method, Transport};
use crate::config::StorefrontConfig;
use crate::storage::{Storage, keys, read_state};

/// Longest backend error body echoed into an [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Talks JSON over HTTP to the configured backend.
///
/// Cookies are kept across calls (credentials are included on every request).
/// The bearer token is read from the persisted auth state each time a request
/// is built, so a login in the same process takes effect on the next call.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// The slice of the persisted auth state the transport needs.
#[derive(Debug, Default, Deserialize)]
struct PersistedAuth {
    #[serde(default)]
    user: Option<PersistedUser>,
}

#[derive(Debug, Deserialize)]
struct PersistedUser {
    #[serde(default)]
    token: Option<String>,
}

/// Error body shapes the backend is known to send.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            storage,
        })
    }

    /// Resolve an endpoint path and query against the base URL.
    fn endpoint_url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        endpoint_url(&self.base_url, request)
    }

    /// Bearer token from the persisted auth state, if a user is logged in.
    fn bearer_token(&self) -> Option<String> {
        match read_state::<PersistedAuth>(self.storage.as_ref(), keys::AUTH) {
            Ok(auth) => auth.and_then(|a| a.user).and_then(|u| u.token),
            Err(e) => {
                error!(error = %e, "Error parsing persisted auth state");
                None
            }
        }
    }
}

/// Join `request.path` onto `base` (keeping the base path) and append the query.
fn endpoint_url(base: &Url, request: &ApiRequest) -> Result<Url, ApiError> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), request.path);
    let mut url = Url::parse(&joined)?;
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Pull a human-readable message out of an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect())
}

const fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.endpoint_url(&request)?;

        let mut builder = self
            .client
            .request(reqwest_method(request.method), url);
        if let Some(token) = self.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = request.idempotency_key {
            builder = builder.header("Idempotency-Key", key.to_string());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        debug!(status = %status, bytes = text.len(), "Backend response");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn transport(storage: Arc<dyn Storage>) -> HttpTransport {
        HttpTransport::new(&StorefrontConfig::default(), storage).unwrap()
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let base = Url::parse("http://localhost:7000/api").unwrap();
        let request = ApiRequest::new(Method::Get, "/products");
        assert_eq!(
            endpoint_url(&base, &request).unwrap().as_str(),
            "http://localhost:7000/api/products"
        );

        let base = Url::parse("http://localhost:7000/api/").unwrap();
        assert_eq!(
            endpoint_url(&base, &request).unwrap().as_str(),
            "http://localhost:7000/api/products"
        );
    }

    #[test]
    fn test_endpoint_url_encodes_query() {
        let base = Url::parse("http://localhost:7000/api").unwrap();
        let request = ApiRequest::new(Method::Get, "/products").query("search", "wool & felt");
        assert_eq!(
            endpoint_url(&base, &request).unwrap().as_str(),
            "http://localhost:7000/api/products?search=wool+%26+felt"
        );
    }

    #[test]
    fn test_bearer_token_read_from_auth_state() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let http = transport(Arc::clone(&storage));
        assert!(http.bearer_token().is_none());

        storage
            .save(
                keys::AUTH,
                r#"{"state":{"user":{"id":"u-1","email":"a@b.c","token":"tok-123"},"isLoggedIn":true},"version":0}"#,
            )
            .unwrap();
        assert_eq!(http.bearer_token().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_bearer_token_ignores_corrupt_state() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.save(keys::AUTH, "not json").unwrap();
        assert!(transport(storage).bearer_token().is_none());
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Out of stock"}"#), "Out of stock");
        assert_eq!(error_message(r#"{"error":"Forbidden"}"#), "Forbidden");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
