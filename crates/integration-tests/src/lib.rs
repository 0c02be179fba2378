//! In-process mock shop backend for integration tests.
//!
//! [`MockShop`] serves the same REST surface the client consumes, backed by
//! in-memory state. Every request is recorded (method, path, JSON body) so
//! tests can assert exactly which calls were — or were not — issued, and
//! individual endpoints can be forced to fail with a canned error message.
//!
//! Behavior mirrors the real backend: JSON bodies on success, an
//! `{"error": "..."}` envelope on failure, and a binary body for order XML.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use shoplane_client::api::ShopClient;
use shoplane_client::config::ClientConfig;
use shoplane_client::controller::App;

/// Start a mock backend and a controller wired to it.
///
/// The order-redirect delay is zeroed so tests don't sleep; downloads go
/// into the returned temp directory.
pub async fn spawn_app() -> (MockShop, App, tempfile::TempDir) {
    let shop = MockShop::start().await;
    let download_dir = tempfile::tempdir().expect("create download dir");

    let config = ClientConfig {
        api_base: shop.base_url(),
        download_dir: download_dir.path().to_path_buf(),
        notice_ttl: std::time::Duration::from_secs(5),
        order_redirect_delay: std::time::Duration::ZERO,
    };
    let app = App::new(ShopClient::new(config.api_base.clone()), config);

    (shop, app, download_dir)
}

/// One request the mock has seen.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"METHOD /path"` form used by matching helpers.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Shared mutable backend state.
#[derive(Default)]
pub struct ShopState {
    products: Mutex<Vec<Value>>,
    users: Mutex<Vec<Value>>,
    carts: Mutex<HashMap<String, Vec<Value>>>,
    orders: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    /// `"METHOD /path"` -> error message; matching requests fail with 400.
    failures: Mutex<HashMap<String, String>>,
    order_counter: Mutex<u32>,
}

/// A running mock backend.
pub struct MockShop {
    addr: SocketAddr,
    state: Arc<ShopState>,
}

impl MockShop {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound (test environment fault).
    pub async fn start() -> Self {
        let state = Arc::new(ShopState::default());

        let app = Router::new()
            .route("/api/products", get(get_products).post(create_product))
            .route("/api/products/{product_id}", get(get_product))
            .route("/api/users", get(get_users).post(create_user))
            .route("/api/users/{user_id}", get(get_user))
            .route("/api/users/{user_id}/address", post(update_address))
            .route("/api/users/{user_id}/orders", get(get_user_orders))
            .route("/api/cart/{user_id}", get(get_cart))
            .route("/api/cart/{user_id}/add", post(add_to_cart))
            .route("/api/cart/{user_id}/remove", post(remove_from_cart))
            .route("/api/orders", post(create_order))
            .route("/api/orders/{order_id}/status", put(update_order_status))
            .route("/api/orders/{order_id}/xml", get(order_xml))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                record_and_inject,
            ))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL the client should be pointed at.
    ///
    /// # Panics
    ///
    /// Never in practice; the bound address is always a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock base url")
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn seed_product(&self, product_id: &str, name: &str, price: f64, stock: u32) {
        self.state.products.lock().expect("state lock").push(json!({
            "product_id": product_id,
            "name": name,
            "price": price,
            "stock": stock,
        }));
    }

    pub fn seed_user(&self, user_id: &str, username: &str, email: &str) {
        self.state.users.lock().expect("state lock").push(json!({
            "user_id": user_id,
            "username": username,
            "email": email,
            "address": Value::Null,
        }));
    }

    pub fn seed_cart_item(
        &self,
        user_id: &str,
        product_id: &str,
        name: &str,
        price: f64,
        quantity: u32,
    ) {
        self.state
            .carts
            .lock()
            .expect("state lock")
            .entry(user_id.to_owned())
            .or_default()
            .push(json!({
                "product_id": product_id,
                "name": name,
                "price": price,
                "quantity": quantity,
            }));
    }

    pub fn seed_order(&self, order_id: &str, user_id: &str, status: &str, items: Vec<Value>) {
        let total: f64 = items
            .iter()
            .map(|item| {
                item["price"].as_f64().unwrap_or_default()
                    * item["quantity"].as_f64().unwrap_or_default()
            })
            .sum();
        self.state.orders.lock().expect("state lock").push(json!({
            "order_id": order_id,
            "user_id": user_id,
            "status": status,
            "total_price": total,
            "creation_date": "2024-03-01T12:30:00",
            "items": items,
        }));
    }

    // =========================================================================
    // Failure injection & request inspection
    // =========================================================================

    /// Force `METHOD path` to answer `400 {"error": message}`.
    pub fn fail(&self, method: &str, path: &str, message: &str) {
        self.state
            .failures
            .lock()
            .expect("state lock")
            .insert(format!("{method} {path}"), message.to_owned());
    }

    /// Every request seen so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("state lock").clone()
    }

    /// Requests whose `"METHOD /path"` signature starts with `prefix`.
    #[must_use]
    pub fn requests_matching(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.signature().starts_with(prefix))
            .collect()
    }

    /// Forget all recorded requests (keeps seeded data).
    pub fn clear_requests(&self) {
        self.state.requests.lock().expect("state lock").clear();
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Record every request; answer injected failures before the handler runs.
async fn record_and_inject(
    State(state): State<Arc<ShopState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let method = parts.method.to_string();
    let path = parts.uri.path().to_owned();
    state
        .requests
        .lock()
        .expect("state lock")
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body: serde_json::from_slice(&bytes).ok(),
        });

    let injected = state
        .failures
        .lock()
        .expect("state lock")
        .get(&format!("{method} {path}"))
        .cloned();
    if let Some(message) = injected {
        return error_response(StatusCode::BAD_REQUEST, &message);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    next.run(request).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_products(State(state): State<Arc<ShopState>>) -> Response {
    let products = state.products.lock().expect("state lock").clone();
    Json(json!({ "products": products })).into_response()
}

async fn get_product(
    State(state): State<Arc<ShopState>>,
    Path(product_id): Path<String>,
) -> Response {
    let products = state.products.lock().expect("state lock");
    products
        .iter()
        .find(|p| p["product_id"] == product_id)
        .map_or_else(
            || error_response(StatusCode::NOT_FOUND, "Product not found"),
            |product| Json(json!({ "product": product })).into_response(),
        )
}

async fn create_product(State(state): State<Arc<ShopState>>, Json(body): Json<Value>) -> Response {
    state.products.lock().expect("state lock").push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product added", "product": body })),
    )
        .into_response()
}

async fn get_users(State(state): State<Arc<ShopState>>) -> Response {
    let users = state.users.lock().expect("state lock").clone();
    Json(json!({ "users": users })).into_response()
}

async fn create_user(State(state): State<Arc<ShopState>>, Json(body): Json<Value>) -> Response {
    let mut user = body;
    if user.get("address").is_none() {
        user["address"] = Value::Null;
    }
    state.users.lock().expect("state lock").push(user.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "user": user })),
    )
        .into_response()
}

async fn get_user(State(state): State<Arc<ShopState>>, Path(user_id): Path<String>) -> Response {
    let users = state.users.lock().expect("state lock");
    users.iter().find(|u| u["user_id"] == user_id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "User not found"),
        |user| Json(json!({ "user": user })).into_response(),
    )
}

async fn update_address(
    State(state): State<Arc<ShopState>>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut users = state.users.lock().expect("state lock");
    let Some(user) = users.iter_mut().find(|u| u["user_id"] == user_id) else {
        return error_response(StatusCode::NOT_FOUND, "User not found");
    };
    user["address"] = body["address"].clone();
    Json(json!({ "message": "Address updated", "user": user })).into_response()
}

async fn get_cart(State(state): State<Arc<ShopState>>, Path(user_id): Path<String>) -> Response {
    let carts = state.carts.lock().expect("state lock");
    let items = carts.get(&user_id).cloned().unwrap_or_default();
    let total: f64 = items
        .iter()
        .map(|item| {
            item["price"].as_f64().unwrap_or_default()
                * item["quantity"].as_f64().unwrap_or_default()
        })
        .sum();
    Json(json!({ "items": items, "total": total })).into_response()
}

async fn add_to_cart(
    State(state): State<Arc<ShopState>>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let product = {
        let products = state.products.lock().expect("state lock");
        products
            .iter()
            .find(|p| p["product_id"] == body["product_id"])
            .cloned()
    };
    let Some(product) = product else {
        return error_response(StatusCode::BAD_REQUEST, "Cannot add to cart");
    };

    let mut carts = state.carts.lock().expect("state lock");
    let cart = carts.entry(user_id).or_default();
    cart.retain(|item| item["product_id"] != body["product_id"]);
    cart.push(json!({
        "product_id": product["product_id"],
        "name": product["name"],
        "price": product["price"],
        "quantity": body["quantity"],
    }));

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product added to cart" })),
    )
        .into_response()
}

async fn remove_from_cart(
    State(state): State<Arc<ShopState>>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut carts = state.carts.lock().expect("state lock");
    if let Some(cart) = carts.get_mut(&user_id) {
        cart.retain(|item| item["product_id"] != body["product_id"]);
    }
    Json(json!({ "message": "Product removed from cart" })).into_response()
}

async fn create_order(State(state): State<Arc<ShopState>>, Json(body): Json<Value>) -> Response {
    let Some(user_id) = body["user_id"].as_str().map(ToOwned::to_owned) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing user_id");
    };

    let items = state
        .carts
        .lock()
        .expect("state lock")
        .remove(&user_id)
        .unwrap_or_default();
    if items.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Cannot create order: cart is empty");
    }

    let total: f64 = items
        .iter()
        .map(|item| {
            item["price"].as_f64().unwrap_or_default()
                * item["quantity"].as_f64().unwrap_or_default()
        })
        .sum();

    let order_id = {
        let mut counter = state.order_counter.lock().expect("state lock");
        *counter += 1;
        format!("ORD-{counter:04}")
    };

    let order = json!({
        "order_id": order_id,
        "user_id": user_id,
        "status": "pending",
        "total_price": total,
        "creation_date": "2024-03-01T12:30:00",
        "items": items,
    });
    state.orders.lock().expect("state lock").push(order.clone());

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Order placed", "order": order })),
    )
        .into_response()
}

async fn get_user_orders(
    State(state): State<Arc<ShopState>>,
    Path(user_id): Path<String>,
) -> Response {
    let orders: Vec<Value> = state
        .orders
        .lock()
        .expect("state lock")
        .iter()
        .filter(|order| order["user_id"] == user_id)
        .cloned()
        .collect();
    Json(json!({ "orders": orders })).into_response()
}

async fn update_order_status(
    State(state): State<Arc<ShopState>>,
    Path(order_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut orders = state.orders.lock().expect("state lock");
    let Some(order) = orders.iter_mut().find(|o| o["order_id"] == order_id) else {
        return error_response(StatusCode::NOT_FOUND, "Order not found");
    };
    order["status"] = body["status"].clone();
    Json(json!({ "message": "Order status updated" })).into_response()
}

async fn order_xml(State(state): State<Arc<ShopState>>, Path(order_id): Path<String>) -> Response {
    let orders = state.orders.lock().expect("state lock");
    let Some(order) = orders.iter().find(|o| o["order_id"] == order_id) else {
        return error_response(StatusCode::NOT_FOUND, "Order not found");
    };

    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<order id=\"{}\" status=\"{}\"/>\n",
        order_id,
        order["status"].as_str().unwrap_or_default()
    );
    (
        StatusCode::OK,
        [("content-type", "application/xml")],
        xml.into_bytes(),
    )
        .into_response()
}
