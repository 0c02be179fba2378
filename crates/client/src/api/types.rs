//! Wire schemas for the shop backend REST API.
//!
//! These types pin the JSON shape of every endpoint the client consumes, so
//! a payload mismatch fails at deserialization rather than at render time.
//! Every non-2xx response carries an [`ErrorBody`] instead.

use serde::{Deserialize, Serialize};
use shoplane_core::{OrderId, OrderStatus, Price, ProductId, UserId};

// =============================================================================
// Error Envelope
// =============================================================================

/// Failure body returned by every endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message, surfaced to the user verbatim.
    pub error: String,
}

/// Generic success acknowledgement: `{"message": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Products
// =============================================================================

/// A product in the catalog. Stock is authoritative on the server; the
/// client reads it only for display and for the add-to-cart quantity bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: u32,
}

/// `GET /api/products`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// `GET /api/products/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// `POST /api/products`
#[derive(Debug, Clone, Serialize)]
pub struct CreateProductRequest {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: u32,
}

// =============================================================================
// Users
// =============================================================================

/// A shop user. Selection of the active user stands in for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub address: Option<String>,
}

/// `GET /api/users`
#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// `GET /api/users/{id}` and the body echoed by address updates.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// `POST /api/users`
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// `POST /api/users/{id}/address`
#[derive(Debug, Clone, Serialize)]
pub struct AddressUpdateRequest {
    pub address: String,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a server-side cart (also reused for order lines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

/// `GET /api/cart/{userId}`
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
}

/// `POST /api/cart/{userId}/add`
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `POST /api/cart/{userId}/remove`
#[derive(Debug, Clone, Serialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_price: Price,
    /// ISO 8601 creation timestamp.
    pub creation_date: chrono::NaiveDateTime,
    pub items: Vec<CartItem>,
}

/// `GET /api/users/{id}/orders`
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// `GET /api/orders/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// `POST /api/orders`
///
/// The server converts the user's current server-side cart into an order;
/// the client never transmits cart contents.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
}

/// Body of a successful order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreatedResponse {
    pub message: String,
    pub order: Order,
}

/// `PUT /api/orders/{id}/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}
