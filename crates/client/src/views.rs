//! Typed view-models and their terminal rendering.
//!
//! Wire types are converted into plain display structs here, so application
//! state never lives in rendered output. `Display` impls produce the
//! terminal UI; swapping the front end only means replacing those impls.

use std::time::{Duration, Instant};

use shoplane_core::{OrderId, Price, ProductId};

use crate::api::types::{CartItem, Order, Product, User};
use crate::filters::format_timestamp;

/// Stock count below which a product is flagged as running low.
const LOW_STOCK_THRESHOLD: u32 = 5;

// =============================================================================
// Sections
// =============================================================================

/// The sections of the single-page UI. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Products,
    Cart,
    Checkout,
    Orders,
    Admin,
}

impl Section {
    /// Section title shown above the rendered screen.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Cart => "Cart",
            Self::Checkout => "Checkout",
            Self::Orders => "Orders",
            Self::Admin => "Admin",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "products" => Ok(Self::Products),
            "cart" => Ok(Self::Cart),
            "checkout" => Ok(Self::Checkout),
            "orders" => Ok(Self::Orders),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("unknown section: {s}")),
        }
    }
}

// =============================================================================
// Notices
// =============================================================================

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    #[must_use]
    const fn tag(self) -> &'static str {
        match self {
            Self::Info => "[info]",
            Self::Success => "[ok]",
            Self::Error => "[error]",
        }
    }
}

/// A transient notice with an expiry instant.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    expires_at: Instant,
}

/// Holds live notices; expired ones are pruned whenever the board is read.
///
/// This is the terminal analogue of self-dismissing alert banners: instead
/// of a removal timer per element, each notice carries its expiry and
/// rendering simply skips the dead ones.
#[derive(Debug)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    /// Create a board whose notices live for `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            ttl,
        }
    }

    /// Post a notice.
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            message: message.into(),
            level,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Drop expired notices and return the live ones, oldest first.
    pub fn active(&mut self) -> &[Notice] {
        let now = Instant::now();
        self.notices.retain(|notice| notice.expires_at > now);
        &self.notices
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.level.tag(), self.message)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Display data for one product card.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
    pub stock_label: String,
    pub low_stock: bool,
    pub add_enabled: bool,
    /// Upper bound for the quantity prompt; the lower bound is always 1.
    pub max_quantity: u32,
    /// Locally remembered quantity, if this product is in the cart mirror.
    pub in_cart: Option<u32>,
}

impl ProductCardView {
    /// Build a card from a catalog product and the session's mirror hint.
    #[must_use]
    pub fn from_product(product: &Product, in_cart: Option<u32>) -> Self {
        let stock_label = if product.stock == 0 {
            "Out of stock".to_owned()
        } else {
            format!("{} in stock", product.stock)
        };

        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price.to_string(),
            stock_label,
            low_stock: product.stock > 0 && product.stock < LOW_STOCK_THRESHOLD,
            add_enabled: product.stock > 0,
            max_quantity: product.stock,
            in_cart,
        }
    }
}

impl std::fmt::Display for ProductCardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<10} {:<24} {:>10}  {}",
            self.product_id, self.name, self.price, self.stock_label
        )?;
        if self.low_stock {
            write!(f, " (low)")?;
        }
        if !self.add_enabled {
            write!(f, " [add disabled]")?;
        }
        if let Some(quantity) = self.in_cart {
            write!(f, " [in cart x{quantity}]")?;
        }
        Ok(())
    }
}

/// The products section.
#[derive(Debug, Clone, Default)]
pub struct CatalogScreen {
    pub cards: Vec<ProductCardView>,
}

impl std::fmt::Display for CatalogScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cards.is_empty() {
            return writeln!(f, "No products available");
        }
        for card in &self.cards {
            writeln!(f, "{card}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One rendered cart line, with the computed line total.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            unit_price: item.price.to_string(),
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
        }
    }
}

/// The cart section: lines, summary, checkout affordance.
#[derive(Debug, Clone)]
pub struct CartScreen {
    pub lines: Vec<CartLineView>,
    /// Number of distinct cart positions.
    pub item_count: usize,
    /// Grand total, computed client-side from the fetched lines.
    pub total: String,
}

impl CartScreen {
    /// Build the cart screen from freshly fetched server items.
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        let total: Price = items.iter().map(CartItem::line_total).sum();
        Self {
            lines: items.iter().map(CartLineView::from).collect(),
            item_count: items.len(),
            total: total.to_string(),
        }
    }

    /// Whether the distinct empty state should render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl std::fmt::Display for CartScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            // Empty state renders alone; the summary panel stays clear.
            return writeln!(f, "Your cart is empty");
        }
        for line in &self.lines {
            writeln!(
                f,
                "{:<10} {:<24} {} x {:<3} = {}",
                line.product_id, line.name, line.unit_price, line.quantity, line.line_total
            )?;
        }
        writeln!(f, "---")?;
        writeln!(f, "Items: {}", self.item_count)?;
        writeln!(f, "Total: {}", self.total)?;
        writeln!(f, "Type `checkout` to proceed")
    }
}

// =============================================================================
// Users
// =============================================================================

/// Display data for one selectable user card.
#[derive(Debug, Clone)]
pub struct UserCardView {
    pub user_id: shoplane_core::UserId,
    pub username: String,
    pub email: String,
    /// Marks the currently active user.
    pub active: bool,
}

impl UserCardView {
    #[must_use]
    pub fn from_user(user: &User, active: bool) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            active,
        }
    }
}

/// The user-selection list.
#[derive(Debug, Clone, Default)]
pub struct UserPicker {
    pub cards: Vec<UserCardView>,
}

impl std::fmt::Display for UserPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cards.is_empty() {
            return writeln!(f, "No users yet. Add them in the Admin panel.");
        }
        for card in &self.cards {
            write!(f, "{:<10} {:<20} {}", card.user_id, card.username, card.email)?;
            if card.active {
                write!(f, "  [active]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The two independent places the active user shows up: the header badge
/// and the checkout panel. Both derive from the one session.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub header_badge: String,
    pub checkout_panel: Option<CheckoutPanelView>,
}

/// Active-user details rendered inside the checkout section.
#[derive(Debug, Clone)]
pub struct CheckoutPanelView {
    pub username: String,
    pub email: String,
    pub address: Option<String>,
}

impl SessionView {
    #[must_use]
    pub fn from_user(user: Option<&User>) -> Self {
        match user {
            Some(user) => Self {
                header_badge: format!("user: {}", user.username),
                checkout_panel: Some(CheckoutPanelView {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    address: user.address.clone(),
                }),
            },
            None => Self {
                header_badge: "no user selected".to_owned(),
                checkout_panel: None,
            },
        }
    }
}

/// The checkout section: signed-in panel plus the address buffer.
#[derive(Debug, Clone)]
pub struct CheckoutScreen {
    pub session: SessionView,
    pub address_buffer: String,
}

impl std::fmt::Display for CheckoutScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.session.checkout_panel {
            Some(panel) => {
                writeln!(f, "Signed in as: {} ({})", panel.username, panel.email)?;
                if let Some(address) = &panel.address {
                    writeln!(f, "Address on file: {address}")?;
                }
            }
            None => writeln!(f, "No user selected. Use `select <user-id>` first.")?,
        }
        if self.address_buffer.is_empty() {
            writeln!(f, "Shipping address: (empty)")?;
        } else {
            writeln!(f, "Shipping address: {}", self.address_buffer)?;
        }
        writeln!(f, "Type `order [address]` to place the order")
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One rendered order line.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Display data for one order card.
#[derive(Debug, Clone)]
pub struct OrderCardView {
    pub order_id: OrderId,
    pub status_label: String,
    pub status_class: String,
    pub placed_at: String,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    /// Selector options: the empty "choose" sentinel plus the five statuses.
    pub status_options: Vec<&'static str>,
}

impl From<&Order> for OrderCardView {
    fn from(order: &Order) -> Self {
        let mut status_options = vec![""];
        status_options.extend(shoplane_core::OrderStatus::ALL.iter().map(|s| s.as_str()));

        Self {
            order_id: order.order_id.clone(),
            status_label: order.status.label().to_owned(),
            status_class: order.status.css_class().to_owned(),
            placed_at: format_timestamp(&order.creation_date),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.price.to_string(),
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            total: order.total_price.to_string(),
            status_options,
        }
    }
}

impl std::fmt::Display for OrderCardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} [{}] placed {}", self.order_id, self.status_label, self.placed_at)?;
        for line in &self.lines {
            writeln!(
                f,
                "  {:<24} {} x @ {} = {}",
                line.name, line.quantity, line.unit_price, line.line_total
            )?;
        }
        writeln!(f, "  Total: {}", self.total)?;
        writeln!(
            f,
            "  `status {} <{}>` to change, `xml {}` to download",
            self.order_id,
            self.status_options[1..].join("|"),
            self.order_id
        )
    }
}

/// The orders section.
#[derive(Debug, Clone, Default)]
pub struct OrdersScreen {
    pub cards: Vec<OrderCardView>,
}

impl std::fmt::Display for OrdersScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cards.is_empty() {
            return writeln!(f, "No orders yet");
        }
        for card in &self.cards {
            writeln!(f, "{card}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Screen
// =============================================================================

/// What the front end renders after a controller operation.
#[derive(Debug, Clone)]
pub enum Screen {
    Products(CatalogScreen),
    Cart(CartScreen),
    Checkout(CheckoutScreen),
    Orders(OrdersScreen),
    Users(UserPicker),
    Admin,
    /// The triggering view switched away before the response arrived;
    /// nothing should be rendered.
    Stale,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Products(screen) => screen.fmt(f),
            Self::Cart(screen) => screen.fmt(f),
            Self::Checkout(screen) => screen.fmt(f),
            Self::Orders(screen) => screen.fmt(f),
            Self::Users(picker) => picker.fmt(f),
            Self::Admin => {
                writeln!(f, "Admin: `new-product <id> <name> <price> <stock>`")?;
                writeln!(f, "       `new-user <id> <username> <email>`")
            }
            Self::Stale => Ok(()),
        }
    }
}
