//! Catalog endpoints.

use brimline_core::{CategoryId, NewProduct, Product, ProductId, ProductPatch};
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest, Method, endpoints, list_or_empty};

impl ApiClient {
    /// `GET /products`, the full catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.product_query(ApiRequest::new(Method::Get, endpoints::PRODUCTS))
            .await
    }

    /// `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.get(endpoints::item(endpoints::PRODUCTS, id.as_str()))
            .await
    }

    /// `POST /products`. Returns the created product when the backend echoes it.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the product.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Option<Product>, ApiError> {
        self.post(endpoints::PRODUCTS.to_owned(), product).await
    }

    /// `PATCH /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, ApiError> {
        self.patch(endpoints::item(endpoints::PRODUCTS, id.as_str()), patch)
            .await
    }

    /// `DELETE /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the delete.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(endpoints::item(endpoints::PRODUCTS, id.as_str()))
            .await
    }

    /// `GET /products?categoryId=...`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a product list.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn products_by_category(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        self.product_query(
            ApiRequest::new(Method::Get, endpoints::PRODUCTS).query("categoryId", category),
        )
        .await
    }

    /// `GET /products?search=...`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        self.product_query(ApiRequest::new(Method::Get, endpoints::PRODUCTS).query("search", query))
            .await
    }

    async fn product_query(&self, request: ApiRequest) -> Result<Vec<Product>, ApiError> {
        let value = self.transport.send(request).await?;
        list_or_empty(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::testing::FakeTransport;

    #[tokio::test]
    async fn test_list_products_accepts_mongo_ids_and_string_prices() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            endpoints::PRODUCTS,
            json!([
                { "_id": "cap-1", "name": "Field Cap", "price": 24.5 },
                { "id": "cap-2", "name": "Trucker", "price": "18.00" }
            ]),
        );

        let products = fake.client().list_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id.as_str(), "cap-1");
        assert_eq!(products[0].price, Decimal::new(245, 1));
        assert_eq!(products[1].price, Decimal::new(18, 0));
    }

    #[tokio::test]
    async fn test_search_and_category_use_query_params() {
        let fake = FakeTransport::new();
        let client = fake.client();
        client.search_products("wool").await.unwrap();
        client
            .products_by_category(&CategoryId::new("beanies"))
            .await
            .unwrap();

        let sent = fake.requests_to(Method::Get, endpoints::PRODUCTS);
        assert_eq!(sent[0].query, vec![("search".into(), "wool".into())]);
        assert_eq!(sent[1].query, vec![("categoryId".into(), "beanies".into())]);
    }

    #[tokio::test]
    async fn test_get_product_encodes_id() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/products/cap%2F9",
            json!({ "id": "cap/9", "name": "Odd", "price": 1 }),
        );
        let product = fake
            .client()
            .get_product(&ProductId::new("cap/9"))
            .await
            .unwrap();
        assert_eq!(product.name, "Odd");
    }

    #[tokio::test]
    async fn test_create_product_tolerates_empty_body() {
        let fake = FakeTransport::new();
        let created = fake
            .client()
            .create_product(&NewProduct::new("Cap", "Brimline", Decimal::ONE, Vec::new()))
            .await
            .unwrap();
        assert!(created.is_none());
    }
}
