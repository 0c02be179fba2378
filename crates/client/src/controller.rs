//! The application controller.
//!
//! [`App`] owns the session, the API client, and the active section, and
//! implements every user-facing operation: section routing with loaders,
//! the catalog and cart controllers, user selection, order management, and
//! the admin create actions. Operations return typed [`Screen`]s for the
//! front end to render; failures propagate as [`AppError`] and are turned
//! into a notice exactly once, by [`App::surface_error`].
//!
//! Each section switch bumps a view generation. Loader results stamped with
//! an older generation are discarded instead of rendering into a view the
//! user has already left.

use std::path::PathBuf;

use shoplane_core::{Email, OrderId, OrderStatus, Price, ProductId, UserId};

use crate::api::ShopClient;
use crate::api::types::{CreateProductRequest, CreateUserRequest, Product};
use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use crate::session::{CartEntry, Session};
use crate::views::{
    CartScreen, CatalogScreen, CheckoutScreen, Notice, NoticeBoard, NoticeLevel, OrderCardView,
    OrdersScreen, ProductCardView, Screen, Section, SessionView, UserCardView, UserPicker,
};

/// The storefront controller.
pub struct App {
    client: ShopClient,
    config: ClientConfig,
    session: Session,
    section: Section,
    /// Snapshot of the last fetched catalog; backs the add-to-cart
    /// quantity bound without another round trip.
    catalog: Vec<Product>,
    /// Shipping address typed into the checkout form, cleared on success.
    address_buffer: String,
    notices: NoticeBoard,
    generation: u64,
}

impl App {
    /// Create a controller talking to `client`.
    #[must_use]
    pub fn new(client: ShopClient, config: ClientConfig) -> Self {
        let notices = NoticeBoard::new(config.notice_ttl);
        Self {
            client,
            config,
            session: Session::new(),
            section: Section::Products,
            catalog: Vec::new(),
            address_buffer: String::new(),
            notices,
            generation: 0,
        }
    }

    /// The currently active section.
    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    /// The session (read-only; mutation goes through operations).
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Header badge and checkout panel derived from the session.
    #[must_use]
    pub fn session_view(&self) -> SessionView {
        SessionView::from_user(self.session.current_user())
    }

    /// Live notices, oldest first.
    pub fn notices(&mut self) -> &[Notice] {
        self.notices.active()
    }

    /// Turn a failed operation into an error notice. Call once per failure.
    pub fn surface_error(&mut self, err: &AppError) {
        self.notices.push(NoticeLevel::Error, err.user_message());
    }

    fn notify_success(&mut self, message: impl Into<String>) {
        self.notices.push(NoticeLevel::Success, message);
    }

    fn begin_load(&self) -> u64 {
        self.generation
    }

    const fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }

    // =========================================================================
    // View Router
    // =========================================================================

    /// Activate `section` (deactivating all others) and run its loader.
    ///
    /// Products, Cart and Orders re-fetch on every activation; Checkout and
    /// Admin render from state already at hand.
    pub async fn show_section(&mut self, section: Section) -> Result<Screen> {
        self.section = section;
        self.generation += 1;

        match section {
            Section::Products => self.load_products().await,
            Section::Cart => self.load_cart().await,
            Section::Orders => self.load_orders().await,
            Section::Checkout => Ok(self.checkout_screen()),
            Section::Admin => Ok(Screen::Admin),
        }
    }

    /// Startup sequence: land on products, prefetch the user list.
    pub async fn start(&mut self) -> Result<Screen> {
        let screen = self.show_section(Section::Products).await;
        let _ = self.load_users().await;
        screen
    }

    fn checkout_screen(&self) -> Screen {
        Screen::Checkout(CheckoutScreen {
            session: self.session_view(),
            address_buffer: self.address_buffer.clone(),
        })
    }

    // =========================================================================
    // Product Catalog
    // =========================================================================

    /// Fetch and render the catalog, refreshing the local snapshot.
    pub async fn load_products(&mut self) -> Result<Screen> {
        let generation = self.begin_load();
        let products = self.client.products().await?;
        if self.is_stale(generation) {
            return Ok(Screen::Stale);
        }

        self.catalog = products;
        let cards = self
            .catalog
            .iter()
            .map(|product| {
                ProductCardView::from_product(
                    product,
                    self.session.mirror_quantity(&product.product_id),
                )
            })
            .collect();

        Ok(Screen::Products(CatalogScreen { cards }))
    }

    /// Fetch a single product (detail view).
    pub async fn show_product(&mut self, product_id: &ProductId) -> Result<ProductCardView> {
        let product = self.client.product(product_id).await?;
        let in_cart = self.session.mirror_quantity(&product.product_id);
        Ok(ProductCardView::from_product(&product, in_cart))
    }

    /// Add `quantity` units of a catalog product to the active user's cart.
    ///
    /// The quantity is validated against the stock from the last catalog
    /// fetch before any network call; the server remains the authority and
    /// may still reject. Without an active user the view redirects to
    /// checkout and the operation fails.
    pub async fn add_to_cart(&mut self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let product = self
            .catalog
            .iter()
            .find(|p| &p.product_id == product_id)
            .cloned()
            .ok_or_else(|| AppError::UnknownProduct(product_id.to_string()))?;

        if quantity == 0 || quantity > product.stock {
            return Err(AppError::InvalidQuantity {
                quantity,
                stock: product.stock,
            });
        }

        if self.session.current_user().is_none() {
            self.section = Section::Checkout;
            return Err(AppError::NoUserSelected);
        }
        let user_id = self.user_id()?;

        self.client
            .add_to_cart(&user_id, product_id, quantity)
            .await?;

        // Overwrite, never accumulate: the mirror tracks the last request.
        self.session.remember_cart_entry(
            product_id.clone(),
            CartEntry {
                name: product.name.clone(),
                price: product.price,
                quantity,
            },
        );

        self.notify_success(format!("{} (x{quantity}) added to cart", product.name));
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch and render the active user's server-side cart.
    ///
    /// Rendering comes exclusively from the fetched response; the mirror is
    /// never consulted here.
    pub async fn load_cart(&mut self) -> Result<Screen> {
        if self.session.current_user().is_none() {
            self.section = Section::Checkout;
            return Err(AppError::NoUserSelected);
        }
        let user_id = self.user_id()?;

        let generation = self.begin_load();
        let cart = self.client.cart(&user_id).await?;
        if self.is_stale(generation) {
            return Ok(Screen::Stale);
        }

        Ok(Screen::Cart(CartScreen::from_items(&cart.items)))
    }

    /// Remove a product from the server cart, then re-fetch the cart.
    ///
    /// Silently does nothing without an active user. No optimistic update:
    /// the returned screen is always derived from the fresh fetch.
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<Option<Screen>> {
        if self.session.current_user().is_none() {
            return Ok(None);
        }
        let user_id = self.user_id()?;

        self.client.remove_from_cart(&user_id, product_id).await?;
        self.session.forget_cart_entry(product_id);
        self.notify_success("Product removed from cart");

        Ok(Some(self.load_cart().await?))
    }

    // =========================================================================
    // User Selector
    // =========================================================================

    /// Fetch all users and build the selection list.
    ///
    /// Failures are logged instead of surfaced: this loader also runs
    /// implicitly (startup, after user creation) when no picker is open.
    pub async fn load_users(&mut self) -> UserPicker {
        match self.client.users().await {
            Ok(users) => {
                let active_id = self
                    .session
                    .current_user()
                    .map(|user| user.user_id.clone());
                UserPicker {
                    cards: users
                        .iter()
                        .map(|user| {
                            UserCardView::from_user(
                                user,
                                active_id.as_ref() == Some(&user.user_id),
                            )
                        })
                        .collect(),
                }
            }
            Err(err) => {
                tracing::warn!("failed to load users: {err}");
                UserPicker::default()
            }
        }
    }

    /// Fetch the full record for `user_id` and make it the active user.
    ///
    /// Both display locations (header badge, checkout panel) re-derive from
    /// the session; if the cart section is active it is reloaded so totals
    /// reflect the newly selected user's server cart.
    pub async fn select_user(&mut self, user_id: &UserId) -> Result<Option<Screen>> {
        let user = self.client.user(user_id).await?;
        let username = user.username.clone();
        self.session.select_user(user);
        self.notify_success(format!("Selected user: {username}"));

        if self.section == Section::Cart {
            return Ok(Some(self.load_cart().await?));
        }
        Ok(None)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Set the checkout shipping address buffer.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address_buffer = address.into();
    }

    /// Place an order from the active user's server-side cart.
    ///
    /// A non-empty address buffer is pushed to the backend first; if that
    /// update fails the order is never submitted. On success the address
    /// buffer and the cart mirror are cleared, and after the configured
    /// delay the view navigates to the orders section.
    pub async fn create_order(&mut self) -> Result<Screen> {
        let user_id = self.user_id()?;

        let address = self.address_buffer.trim().to_owned();
        if !address.is_empty() {
            self.client.update_address(&user_id, &address).await?;
        }

        self.client.create_order(&user_id).await?;

        self.address_buffer.clear();
        self.session.clear_cart();
        self.notify_success("Order placed!");

        tokio::time::sleep(self.config.order_redirect_delay).await;
        self.show_section(Section::Orders).await
    }

    /// Fetch and render the active user's orders.
    pub async fn load_orders(&mut self) -> Result<Screen> {
        let user_id = self.user_id()?;

        let generation = self.begin_load();
        let orders = self.client.user_orders(&user_id).await?;
        if self.is_stale(generation) {
            return Ok(Screen::Stale);
        }

        Ok(Screen::Orders(OrdersScreen {
            cards: orders.iter().map(OrderCardView::from).collect(),
        }))
    }

    /// Fetch a single order (detail view).
    pub async fn show_order(&mut self, order_id: &OrderId) -> Result<OrderCardView> {
        let order = self.client.order(order_id).await?;
        Ok(OrderCardView::from(&order))
    }

    /// Apply a status selector choice to an order.
    ///
    /// The empty "choose" sentinel is a no-op and issues no network call.
    pub async fn update_order_status(
        &mut self,
        order_id: &OrderId,
        selection: &str,
    ) -> Result<Option<Screen>> {
        if selection.is_empty() {
            return Ok(None);
        }

        let status: OrderStatus = selection
            .parse()
            .map_err(|_| AppError::InvalidStatus(selection.to_owned()))?;

        self.client.update_order_status(order_id, status).await?;
        self.notify_success("Order status updated");

        Ok(Some(self.load_orders().await?))
    }

    /// Download the XML rendition of an order into the download directory.
    ///
    /// Returns the path written. Failures surface the backend's error
    /// message and write nothing.
    pub async fn download_order_xml(&mut self, order_id: &OrderId) -> Result<PathBuf> {
        let bytes = self.client.order_xml(order_id).await?;

        let path = self.config.download_dir.join(format!("{order_id}.xml"));
        std::fs::write(&path, bytes)?;

        self.notify_success("XML file downloaded");
        Ok(path)
    }

    // =========================================================================
    // Admin create actions
    // =========================================================================

    /// Register a new product, then reload the catalog.
    ///
    /// Validation is presence-only: empty strings and zero numbers are both
    /// rejected as missing, so a free product or one created with no stock
    /// cannot be entered here.
    pub async fn create_product(
        &mut self,
        product_id: &str,
        name: &str,
        price: Price,
        stock: u32,
    ) -> Result<Screen> {
        if product_id.is_empty() || name.is_empty() || price == Price::default() || stock == 0 {
            return Err(AppError::MissingFields);
        }

        self.client
            .create_product(&CreateProductRequest {
                product_id: ProductId::new(product_id),
                name: name.to_owned(),
                price,
                stock,
            })
            .await?;

        self.notify_success("Product added successfully!");
        self.load_products().await
    }

    /// Register a new user, then reload the user list.
    pub async fn create_user(
        &mut self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> Result<UserPicker> {
        if user_id.is_empty() || username.is_empty() || email.is_empty() {
            return Err(AppError::MissingFields);
        }
        let email = Email::parse(email)?;

        self.client
            .create_user(&CreateUserRequest {
                user_id: UserId::new(user_id),
                username: username.to_owned(),
                email: email.into_inner(),
                address: None,
            })
            .await?;

        self.notify_success("User created successfully!");
        Ok(self.load_users().await)
    }

    fn user_id(&self) -> Result<UserId> {
        Ok(self.session.require_user()?.user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn app() -> App {
        #[allow(clippy::unwrap_used)]
        let client = ShopClient::new(Url::parse("http://127.0.0.1:1").unwrap());
        App::new(client, ClientConfig::default())
    }

    #[test]
    fn test_section_switch_bumps_generation() {
        let mut app = app();
        let before = app.begin_load();
        app.section = Section::Cart;
        app.generation += 1;
        assert!(app.is_stale(before));
        assert!(!app.is_stale(app.begin_load()));
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_product_is_local() {
        // Client points at a closed port; an attempted request would error
        // with Http, not UnknownProduct.
        let mut app = app();
        let err = app
            .add_to_cart(&ProductId::new("nope"), 1)
            .await
            .expect_err("empty catalog");
        assert!(matches!(err, AppError::UnknownProduct(_)));
    }

    #[tokio::test]
    async fn test_update_order_status_sentinel_is_noop() {
        let mut app = app();
        let result = app
            .update_order_status(&OrderId::new("o1"), "")
            .await
            .expect("sentinel never fails");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_order_status_rejects_unknown_value() {
        let mut app = app();
        let err = app
            .update_order_status(&OrderId::new("o1"), "teleported")
            .await
            .expect_err("unknown status");
        assert!(matches!(err, AppError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn test_create_product_zero_values_rejected() {
        let mut app = app();
        let err = app
            .create_product("P009", "Freebie", Price::default(), 10)
            .await
            .expect_err("zero price reads as missing");
        assert!(matches!(err, AppError::MissingFields));

        let err = app
            .create_product("P009", "Ghost", Price::from_cents(100), 0)
            .await
            .expect_err("zero stock reads as missing");
        assert!(matches!(err, AppError::MissingFields));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_email() {
        let mut app = app();
        let err = app
            .create_user("U009", "kasia", "not-an-email")
            .await
            .expect_err("malformed email");
        assert!(matches!(err, AppError::Email(_)));
    }

    #[test]
    fn test_surface_error_posts_one_notice() {
        let mut app = app();
        app.surface_error(&AppError::NoUserSelected);
        let notices = app.notices();
        assert_eq!(notices.len(), 1);
        assert!(
            notices[0]
                .to_string()
                .contains("You must select a user first")
        );
    }
}
