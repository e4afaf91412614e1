//! Review endpoints.

use brimline_core::{NewReview, ProductId, Review, ReviewId, ReviewStats, ReviewStatus, UserId};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints, list_or_empty};

impl ApiClient {
    /// `POST /reviews`. Submitted reviews always enter moderation as `pending`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the review.
    #[instrument(skip(self, review), fields(product_id = %review.product_id, rating = review.rating))]
    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let mut body = serde_json::to_value(review)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("status".to_owned(), json!(ReviewStatus::Pending));
        }
        self.execute(ApiRequest::new(Method::Post, endpoints::REVIEWS).body(body))
            .await
    }

    /// `GET /reviews`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a review list.
    #[instrument(skip(self))]
    pub async fn list_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.review_list(endpoints::REVIEWS.to_owned()).await
    }

    /// `GET /reviews/product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a review list.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn product_reviews(&self, product: &ProductId) -> Result<Vec<Review>, ApiError> {
        self.review_list(endpoints::scoped(endpoints::REVIEWS, "product", product.as_str()))
            .await
    }

    /// `GET /reviews/user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a review list.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn user_reviews(&self, user: &UserId) -> Result<Vec<Review>, ApiError> {
        self.review_list(endpoints::scoped(endpoints::REVIEWS, "user", user.as_str()))
            .await
    }

    /// `GET /reviews/pending`, the moderation queue.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a review list.
    #[instrument(skip(self))]
    pub async fn pending_reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.review_list(format!("{}/pending", endpoints::REVIEWS))
            .await
    }

    /// `GET /reviews/product/{id}/stats`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a stats object.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn product_review_stats(&self, product: &ProductId) -> Result<ReviewStats, ApiError> {
        let path = format!(
            "{}/stats",
            endpoints::scoped(endpoints::REVIEWS, "product", product.as_str())
        );
        self.execute_or_default(ApiRequest::new(Method::Get, path))
            .await
    }

    /// `GET /reviews/stats`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a stats object.
    #[instrument(skip(self))]
    pub async fn review_stats(&self) -> Result<ReviewStats, ApiError> {
        self.execute_or_default(ApiRequest::new(
            Method::Get,
            format!("{}/stats", endpoints::REVIEWS),
        ))
        .await
    }

    /// `GET /reviews/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the review does not exist.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn get_review(&self, id: &ReviewId) -> Result<Review, ApiError> {
        self.get(endpoints::item(endpoints::REVIEWS, id.as_str()))
            .await
    }

    /// `PATCH /reviews/{id}/status`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the change.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn update_review_status(
        &self,
        id: &ReviewId,
        status: ReviewStatus,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::new(
            Method::Patch,
            endpoints::item_action(endpoints::REVIEWS, id.as_str(), "status"),
        )
        .body(json!({ "status": status }));
        self.execute_unit(request).await
    }

    /// `PATCH /reviews/{id}` with arbitrary fields.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, updates), fields(review_id = %id))]
    pub async fn update_review(&self, id: &ReviewId, updates: &Value) -> Result<Review, ApiError> {
        self.patch(endpoints::item(endpoints::REVIEWS, id.as_str()), updates)
            .await
    }

    /// `DELETE /reviews/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the delete.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: &ReviewId) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::REVIEWS, id.as_str()))
            .await
    }

    async fn review_list(&self, path: String) -> Result<Vec<Review>, ApiError> {
        let value: Value = self.get(path).await?;
        list_or_empty(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;

    #[tokio::test]
    async fn test_create_review_forces_pending() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            endpoints::REVIEWS,
            json!({ "id": "r-1", "userId": "u-1", "productId": "cap-1", "rating": 5 }),
        );

        let review = NewReview {
            user_id: UserId::new("u-1"),
            product_id: ProductId::new("cap-1"),
            rating: 5,
            comment: "Fits well".into(),
            images: Vec::new(),
        };
        let created = fake.client().create_review(&review).await.unwrap();
        assert_eq!(created.status, ReviewStatus::Pending);

        let body = fake.requests()[0].body.clone().unwrap();
        assert_eq!(body["status"], "pending");
        assert_eq!(body["productId"], "cap-1");
    }

    #[tokio::test]
    async fn test_product_stats_path() {
        let fake = FakeTransport::new();
        fake.client()
            .product_review_stats(&ProductId::new("cap-1"))
            .await
            .unwrap();
        assert_eq!(fake.requests()[0].path, "/reviews/product/cap-1/stats");
    }
}
