//! Scripted transport for tests.
//!
//! Responses are queued per `(method, path)` route and consumed in order;
//! queries are ignored when matching. Requests with no queued response get
//! `null` back, or a 503 once [`FakeTransport::fail_unrouted`] is set.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::storage::{MemoryStorage, Storage};

#[derive(Debug, Clone)]
enum Scripted {
    Ok(Value),
    Status(u16, String),
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(Method, String), VecDeque<Scripted>>,
    requests: Vec<ApiRequest>,
    fail_unrouted: bool,
}

/// In-memory [`Transport`] that records every request.
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Mutex<Script>,
}

impl FakeTransport {
    /// A transport that answers `null` to everything.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, method: Method, path: &str, response: Scripted) -> &Self {
        self.script()
            .routes
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a successful JSON response for `method path`.
    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.push(method, path, Scripted::Ok(body))
    }

    /// Queue a backend rejection for `method path`.
    pub fn on_status(&self, method: Method, path: &str, status: u16) -> &Self {
        self.push(
            method,
            path,
            Scripted::Status(status, format!("scripted {status}")),
        )
    }

    /// Make requests without a queued response fail with 503.
    pub fn fail_unrouted(&self) -> &Self {
        self.script().fail_unrouted = true;
        self
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script().requests.clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.script()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// An [`ApiClient`] backed by this transport.
    #[must_use]
    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(Arc::clone(self) as Arc<dyn Transport>)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut script = self.script();
        let route = (request.method, request.path.clone());
        script.requests.push(request);

        let scripted = script
            .routes
            .get_mut(&route)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Scripted::Ok(body)) => Ok(body),
            Some(Scripted::Status(status, message)) => Err(ApiError::Status { status, message }),
            None if script.fail_unrouted => Err(ApiError::Status {
                status: 503,
                message: "backend unavailable".to_owned(),
            }),
            None => Ok(Value::Null),
        }
    }
}

/// Fresh in-memory storage.
#[must_use]
pub fn memory_storage() -> Arc<dyn Storage> {
    Arc::new(MemoryStorage::new())
}
