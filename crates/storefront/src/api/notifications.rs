//! Notification endpoints.

use brimline_core::{NewNotification, Notification, NotificationId, NotificationStats, UserId};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints, list_or_empty};

fn user_scope(user: &UserId) -> String {
    endpoints::scoped(endpoints::NOTIFICATIONS, "user", user.as_str())
}

impl ApiClient {
    /// `POST /notifications`. New notifications are always created unread.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id))]
    pub async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, ApiError> {
        let mut body = serde_json::to_value(notification)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("read".to_owned(), Value::Bool(false));
        }
        self.execute(ApiRequest::new(Method::Post, endpoints::NOTIFICATIONS).body(body))
            .await
    }

    /// `GET /notifications`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a list.
    #[instrument(skip(self))]
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.notification_list(endpoints::NOTIFICATIONS.to_owned())
            .await
    }

    /// `GET /notifications/user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a list.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn user_notifications(&self, user: &UserId) -> Result<Vec<Notification>, ApiError> {
        self.notification_list(user_scope(user)).await
    }

    /// `GET /notifications/user/{id}/unread`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a list.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn unread_notifications(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, ApiError> {
        self.notification_list(format!("{}/unread", user_scope(user)))
            .await
    }

    /// `GET /notifications/user/{id}/stats`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a stats object.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn notification_stats(&self, user: &UserId) -> Result<NotificationStats, ApiError> {
        self.execute_or_default(ApiRequest::new(
            Method::Get,
            format!("{}/stats", user_scope(user)),
        ))
        .await
    }

    /// `GET /notifications/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the notification does not exist.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn get_notification(&self, id: &NotificationId) -> Result<Notification, ApiError> {
        self.get(endpoints::item(endpoints::NOTIFICATIONS, id.as_str()))
            .await
    }

    /// `PATCH /notifications/{id}/read`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_notification_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        let path = endpoints::item_action(endpoints::NOTIFICATIONS, id.as_str(), "read");
        self.execute_unit(ApiRequest::new(Method::Patch, path).body(json!({})))
            .await
    }

    /// `PATCH /notifications/user/{id}/read-all`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn mark_all_notifications_read(&self, user: &UserId) -> Result<(), ApiError> {
        let path = format!("{}/read-all", user_scope(user));
        self.execute_unit(ApiRequest::new(Method::Patch, path).body(json!({})))
            .await
    }

    /// `PATCH /notifications/{id}` with arbitrary fields.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, updates), fields(notification_id = %id))]
    pub async fn update_notification(
        &self,
        id: &NotificationId,
        updates: &Value,
    ) -> Result<Notification, ApiError> {
        self.patch(endpoints::item(endpoints::NOTIFICATIONS, id.as_str()), updates)
            .await
    }

    /// `DELETE /notifications/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the delete.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn delete_notification(&self, id: &NotificationId) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::NOTIFICATIONS, id.as_str()))
            .await
    }

    async fn notification_list(&self, path: String) -> Result<Vec<Notification>, ApiError> {
        let value: Value = self.get(path).await?;
        list_or_empty(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brimline_core::NotificationKind;

    use super::*;
    use crate::testing::FakeTransport;

    #[tokio::test]
    async fn test_create_sets_unread() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            endpoints::NOTIFICATIONS,
            json!({ "id": "n-1", "userId": "u-1", "type": "promo", "message": "20% off" }),
        );

        let created = fake
            .client()
            .create_notification(&NewNotification {
                user_id: UserId::new("u-1"),
                kind: NotificationKind::Promo,
                message: "20% off".into(),
            })
            .await
            .unwrap();
        assert!(!created.read);

        let body = fake.requests()[0].body.clone().unwrap();
        assert_eq!(body["read"], false);
        assert_eq!(body["type"], "promo");
    }

    #[tokio::test]
    async fn test_read_paths() {
        let fake = FakeTransport::new();
        let client = fake.client();
        client
            .mark_notification_read(&NotificationId::new("n-1"))
            .await
            .unwrap();
        client
            .mark_all_notifications_read(&UserId::new("u-1"))
            .await
            .unwrap();
        client
            .unread_notifications(&UserId::new("u-1"))
            .await
            .unwrap();

        let paths: Vec<String> = fake.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/notifications/n-1/read",
                "/notifications/user/u-1/read-all",
                "/notifications/user/u-1/unread",
            ]
        );
    }
}
