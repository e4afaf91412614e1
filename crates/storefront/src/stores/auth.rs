//! Session identity.
//!
//! The persisted `user.token` is what [`crate::api::HttpTransport`] sends as
//! the bearer token, so logging in or out here changes the credentials of
//! every later request.

use std::sync::Arc;

use brimline_core::{ProfilePatch, Role, User};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::api::{ApiClient, ApiError, AuthResponse, Credentials};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::storage::{Persisted, Storage, keys};

/// Persisted session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_logged_in: bool,
}

impl AuthState {
    /// Role of the logged-in user, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user
            .as_ref()
            .filter(|_| self.is_logged_in)
            .map(|u| u.role)
    }
}

/// The logged-in user.
///
/// Role checks here are advisory; the backend must enforce access itself.
#[derive(Debug)]
pub struct AuthStore {
    state: AuthState,
    persisted: Persisted<AuthState>,
    api: ApiClient,
}

impl AuthStore {
    /// Open the session, restoring a persisted login.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let persisted = Persisted::new(storage, keys::AUTH);
        let state = persisted.load();
        Self {
            state,
            persisted,
            api,
        }
    }

    /// Log in. Returns `false` on any failure, including a response
    /// without a user.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> bool {
        let response = self.api.login(Credentials::new(email, password)).await;
        self.accept(response, "Login error")
    }

    /// Create an account and log in as it. Same contract as [`Self::login`].
    #[instrument(skip(self, password))]
    pub async fn register(&mut self, name: &str, email: &str, password: &SecretString) -> bool {
        let response = self.api.register(name, email, password).await;
        self.accept(response, "Registration error")
    }

    fn accept(&mut self, response: Result<AuthResponse, ApiError>, context: &str) -> bool {
        match response {
            Ok(AuthResponse {
                user: Some(mut user),
                token,
            }) => {
                user.token = token.or(user.token.take());
                info!(user_id = %user.id, role = %user.role, "Logged in");
                set_sentry_user(&user.id, Some(&user.email));
                self.state = AuthState {
                    user: Some(user),
                    is_logged_in: true,
                };
                self.persist();
                true
            }
            Ok(AuthResponse { user: None, .. }) => {
                warn!("{context}: response carried no user");
                false
            }
            Err(e) => {
                error!(error = %e, "{context}");
                false
            }
        }
    }

    /// Forget the session locally and drop the stored token. The backend
    /// session is not invalidated.
    pub fn logout(&mut self) {
        clear_sentry_user();
        self.state = AuthState::default();
        self.persisted.clear();
    }

    /// Merge `patch` into the current user. Local only; no-op when logged out.
    pub fn update_profile(&mut self, patch: ProfilePatch) {
        if let Some(user) = self.state.user.as_mut() {
            user.apply(patch);
            self.persist();
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.state.is_logged_in
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.role() == Some(Role::Admin)
    }

    /// Bearer token of the logged-in user.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.state.user.as_ref().and_then(|u| u.token.as_deref())
    }

    fn persist(&self) {
        self.persisted.save(&self.state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::Method;
    use crate::storage::{MemoryStorage, read_state};
    use crate::testing::FakeTransport;

    fn password() -> SecretString {
        SecretString::from("hunter2".to_owned())
    }

    #[tokio::test]
    async fn test_login_stores_user_with_token() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            "/auth/login",
            json!({ "user": { "_id": "u-1", "email": "kim@brimline.shop", "role": "admin" }, "token": "tok-1" }),
        );
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut auth = AuthStore::new(fake.client(), Arc::clone(&storage));

        assert!(auth.login("kim@brimline.shop", &password()).await);
        assert!(auth.is_logged_in());
        assert!(auth.is_admin());
        assert_eq!(auth.token(), Some("tok-1"));

        let persisted: AuthState = read_state(storage.as_ref(), keys::AUTH).unwrap().unwrap();
        assert_eq!(persisted.user.unwrap().token.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_login_failure_returns_false() {
        let fake = FakeTransport::new();
        fake.on_status(Method::Post, "/auth/login", 401);
        let mut auth = AuthStore::new(fake.client(), Arc::new(MemoryStorage::new()));

        assert!(!auth.login("kim@brimline.shop", &password()).await);
        assert!(!auth.is_logged_in());

        // Empty body: no user, so still a failure
        assert!(!auth.login("kim@brimline.shop", &password()).await);
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_local() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            "/auth/register",
            json!({ "user": { "id": "u-2", "email": "new@brimline.shop" }, "token": "tok-2" }),
        );
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut auth = AuthStore::new(fake.client(), Arc::clone(&storage));
        assert!(auth.register("New", "new@brimline.shop", &password()).await);
        assert!(storage.load(keys::AUTH).unwrap().is_some());

        auth.logout();
        assert!(!auth.is_logged_in());
        assert!(auth.token().is_none());
        assert!(storage.load(keys::AUTH).unwrap().is_none());
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_update_profile_merges_locally() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            "/auth/login",
            json!({ "user": { "id": "u-1", "name": "Kim", "email": "kim@brimline.shop" }, "token": "t" }),
        );
        let mut auth = AuthStore::new(fake.client(), Arc::new(MemoryStorage::new()));
        auth.login("kim@brimline.shop", &password()).await;

        auth.update_profile(ProfilePatch {
            phone: Some("555-0100".into()),
            ..ProfilePatch::default()
        });

        let user = auth.user().unwrap();
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.name, "Kim");
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn test_update_profile_when_logged_out_is_noop() {
        let fake = FakeTransport::new();
        let mut auth = AuthStore::new(fake.client(), Arc::new(MemoryStorage::new()));
        auth.update_profile(ProfilePatch {
            name: Some("Ghost".into()),
            ..ProfilePatch::default()
        });
        assert!(auth.user().is_none());
    }
}
