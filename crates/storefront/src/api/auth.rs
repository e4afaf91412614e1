//! Authentication endpoints.

use brimline_core::User;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints};

/// Email/password pair for login.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a SecretString,
}

impl<'a> Credentials<'a> {
    #[must_use]
    pub const fn new(email: &'a str, password: &'a SecretString) -> Self {
        Self { email, password }
    }
}

/// Body returned by login, register and refresh.
///
/// Both fields are optional: a response without `user` is treated as a
/// failed login by the auth store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials<'_>) -> Result<AuthResponse, ApiError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        self.execute_or_default(ApiRequest::new(Method::Post, endpoints::AUTH_LOGIN).body(body))
            .await
    }

    /// `POST /auth/register`. The display name is sent as `username`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the signup.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        self.register_at(endpoints::AUTH_REGISTER, name, email, password)
            .await
    }

    /// `POST /auth/register-admin`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the signup.
    #[instrument(skip(self, password))]
    pub async fn register_admin(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        self.register_at(endpoints::AUTH_REGISTER_ADMIN, name, email, password)
            .await
    }

    async fn register_at(
        &self,
        path: &str,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = json!({
            "username": name,
            "email": email,
            "password": password.expose_secret(),
        });
        self.execute_or_default(ApiRequest::new(Method::Post, path).body(body))
            .await
    }

    /// `GET /auth/profile` for the current bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the session is not authenticated.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get(endpoints::AUTH_PROFILE.to_owned()).await
    }

    /// `POST /auth/refresh`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the session cannot be refreshed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthResponse, ApiError> {
        self.execute_or_default(
            ApiRequest::new(Method::Post, endpoints::AUTH_REFRESH).body(json!({})),
        )
        .await
    }

    /// `POST /auth/logout`. The auth store does not call this; it is kept for
    /// callers that want server-side session invalidation.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute_unit(ApiRequest::new(Method::Post, endpoints::AUTH_LOGOUT).body(json!({})))
            .await
    }
}
