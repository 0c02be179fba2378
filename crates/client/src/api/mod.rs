//! Typed REST client for the shop backend.
//!
//! One method per backend endpoint, all returning `Result<_, ApiError>`.
//! Requests are single-shot: nothing is retried, batched, or deduplicated,
//! and the server is trusted to serialize conflicting writes.

pub mod types;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use shoplane_core::{OrderId, OrderStatus, ProductId, UserId};

use types::{
    AddToCartRequest, AddressUpdateRequest, CartResponse, CreateOrderRequest,
    CreateProductRequest, CreateUserRequest, ErrorBody, MessageResponse, Order,
    OrderCreatedResponse, OrderResponse, OrdersResponse, Product, ProductResponse,
    ProductsResponse, RemoveFromCartRequest, StatusUpdateRequest, User, UserResponse,
    UsersResponse,
};

/// Errors that can occur when talking to the shop backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected schema.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status and an error message.
    #[error("{message}")]
    Backend {
        /// HTTP status the backend returned.
        status: StatusCode,
        /// The `error` field of the failure body.
        message: String,
    },

    /// The request URL could not be constructed.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the shop backend REST API.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    client: reqwest::Client,
    base: Url,
}

impl ShopClient {
    /// Create a new client for the backend at `base`.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            inner: Arc::new(ShopClientInner {
                client: reqwest::Client::new(),
                base,
            }),
        }
    }

    /// The base URL this client talks to.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    /// Issue a request and decode the success body as `T`.
    ///
    /// Non-success statuses are turned into [`ApiError::Backend`] carrying
    /// the server-provided `error` message.
    async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut request = self.inner.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(backend_error(status, &text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute::<T, ()>(Method::GET, path, None).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch the full product catalog.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let response: ProductsResponse = self.get("/api/products").await?;
        Ok(response.products)
    }

    /// Fetch a single product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let response: ProductResponse = self.get(&format!("/api/products/{product_id}")).await?;
        Ok(response.product)
    }

    /// Register a new product.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn create_product(&self, request: &CreateProductRequest) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .execute(Method::POST, "/api/products", Some(request))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch all users.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let response: UsersResponse = self.get("/api/users").await?;
        Ok(response.users)
    }

    /// Fetch the full record of one user.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user(&self, user_id: &UserId) -> Result<User, ApiError> {
        let response: UserResponse = self.get(&format!("/api/users/{user_id}")).await?;
        Ok(response.user)
    }

    /// Register a new user.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<(), ApiError> {
        let _: MessageResponse = self
            .execute(Method::POST, "/api/users", Some(request))
            .await?;
        Ok(())
    }

    /// Update a user's shipping address.
    #[instrument(skip(self, address), fields(user_id = %user_id))]
    pub async fn update_address(&self, user_id: &UserId, address: &str) -> Result<User, ApiError> {
        let body = AddressUpdateRequest {
            address: address.to_owned(),
        };
        let response: UserResponse = self
            .execute(
                Method::POST,
                &format!("/api/users/{user_id}/address"),
                Some(&body),
            )
            .await?;
        Ok(response.user)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch a user's server-side cart.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart(&self, user_id: &UserId) -> Result<CartResponse, ApiError> {
        self.get(&format!("/api/cart/{user_id}")).await
    }

    /// Add a product to a user's cart.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id, quantity))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id: product_id.clone(),
            quantity,
        };
        let _: MessageResponse = self
            .execute(Method::POST, &format!("/api/cart/{user_id}/add"), Some(&body))
            .await?;
        Ok(())
    }

    /// Remove a product from a user's cart.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let body = RemoveFromCartRequest {
            product_id: product_id.clone(),
        };
        let _: MessageResponse = self
            .execute(
                Method::POST,
                &format!("/api/cart/{user_id}/remove"),
                Some(&body),
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order from the user's current server-side cart.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_order(&self, user_id: &UserId) -> Result<Order, ApiError> {
        let body = CreateOrderRequest {
            user_id: user_id.clone(),
        };
        let response: OrderCreatedResponse = self
            .execute(Method::POST, "/api/orders", Some(&body))
            .await?;
        Ok(response.order)
    }

    /// Fetch one order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let response: OrderResponse = self.get(&format!("/api/orders/{order_id}")).await?;
        Ok(response.order)
    }

    /// Fetch all orders belonging to a user.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        let response: OrdersResponse = self.get(&format!("/api/users/{user_id}/orders")).await?;
        Ok(response.orders)
    }

    /// Set a new status on an order.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let body = StatusUpdateRequest { status };
        let _: MessageResponse = self
            .execute(
                Method::PUT,
                &format!("/api/orders/{order_id}/status"),
                Some(&body),
            )
            .await?;
        Ok(())
    }

    /// Fetch the XML rendition of an order as raw bytes.
    ///
    /// The endpoint returns a binary body on success; failures still carry
    /// the usual JSON `error` envelope.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_xml(&self, order_id: &OrderId) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("/api/orders/{order_id}/xml"))?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(backend_error(status, &text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Build a [`ApiError::Backend`] from a failure body, tolerating bodies that
/// are not the expected JSON envelope.
fn backend_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| format!("backend returned HTTP {status}"),
        |body| body.error,
    );
    ApiError::Backend { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_uses_server_message() {
        let err = backend_error(StatusCode::NOT_FOUND, r#"{"error": "Order not found"}"#);
        assert_eq!(err.to_string(), "Order not found");
        assert!(matches!(
            err,
            ApiError::Backend {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
    }

    #[test]
    fn test_backend_error_tolerates_non_json_body() {
        let err = backend_error(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.to_string(), "backend returned HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_endpoint_join_keeps_base() {
        let client = ShopClient::new(Url::parse("http://127.0.0.1:5004").unwrap());
        let url = client.endpoint("/api/cart/U001/add").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5004/api/cart/U001/add");
    }
}
