//! User administration endpoints.

use brimline_core::{NewUser, User, UserId};
use serde_json::Value;
use tracing::instrument;

use super::{ApiClient, ApiError, endpoints, list_or_empty};

impl ApiClient {
    /// `GET /users`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a user list.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let value: Value = self.get(endpoints::USERS.to_owned()).await?;
        list_or_empty(value)
    }

    /// `GET /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, ApiError> {
        self.get(endpoints::item(endpoints::USERS, id.as_str()))
            .await
    }

    /// `POST /users`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the user.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post(endpoints::USERS.to_owned(), user).await
    }

    /// `PATCH /users/{id}` with arbitrary fields.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, updates), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, updates: &Value) -> Result<User, ApiError> {
        self.patch(endpoints::item(endpoints::USERS, id.as_str()), updates)
            .await
    }

    /// `DELETE /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the delete.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::USERS, id.as_str()))
            .await
    }
}
