//! Per-run session state: the active user and the local cart mirror.
//!
//! The mirror is a best-effort cache keyed by product id. The server holds
//! the authoritative cart; the mirror may diverge (nothing reconciles it on
//! a failed removal) and is never read when rendering the cart view, which
//! always comes from a fresh fetch. Its one deliberate read is the catalog
//! view's "in cart" hint.

use std::collections::HashMap;

use shoplane_core::{Price, ProductId};

use crate::api::types::User;
use crate::error::AppError;

/// A locally remembered cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

/// Mutable session state, owned by the controller.
///
/// All writes go through the methods below so there is exactly one place
/// that may change the active user or the mirror.
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<User>,
    cart: HashMap<ProductId, CartEntry>,
}

impl Session {
    /// Create an empty session: no user, empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active user, if one has been selected.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// The active user, or [`AppError::NoUserSelected`].
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.current_user.as_ref().ok_or(AppError::NoUserSelected)
    }

    /// Make `user` the active user.
    pub fn select_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    /// Remember a cart line locally, overwriting (not accumulating) any
    /// prior entry for the same product.
    pub fn remember_cart_entry(&mut self, product_id: ProductId, entry: CartEntry) {
        self.cart.insert(product_id, entry);
    }

    /// Drop a product from the mirror. Missing entries are fine.
    pub fn forget_cart_entry(&mut self, product_id: &ProductId) {
        self.cart.remove(product_id);
    }

    /// Empty the mirror, e.g. after the server turned the cart into an order.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Locally remembered quantity for a product, if any.
    #[must_use]
    pub fn mirror_quantity(&self, product_id: &ProductId) -> Option<u32> {
        self.cart.get(product_id).map(|entry| entry.quantity)
    }
}
