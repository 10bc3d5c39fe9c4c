//! Cart service.
//!
//! The cart has two backings: the local store for guests and the backend for
//! authenticated users. Which one is authoritative is decided once per
//! operation, and an in-memory snapshot serves synchronous reads either way.
//!
//! Remote mutation failures degrade to the in-memory snapshot with a warning
//! rather than surfacing an error: the user keeps a working cart and the
//! next successful refresh reconciles with the backend.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, warn};

use mercado_core::{Price, ProductId};

use crate::backend::{Backend, BackendError};
use crate::models::cart::{Cart, CartItem, ProductRef};
use crate::services::session::SessionService;
use crate::storage::{KeyValueStore, keys, read_json, write_json};

/// Which state the cart is reading from and writing to.
///
/// Resolved once at the start of each operation so a login or logout midway
/// through cannot split one operation across both backings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartBacking {
    /// Local store is authoritative (no session, or no usable token).
    Guest,
    /// Backend is authoritative.
    Remote,
}

/// One cart line that could not be replayed against the backend during
/// guest-cart migration.
#[derive(Debug)]
pub struct MigrationFailure {
    pub item: CartItem,
    pub error: BackendError,
}

/// Outcome of a guest-cart migration.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Products successfully replayed into the remote cart.
    pub migrated: Vec<ProductId>,
    /// Lines the backend rejected or that failed in transit.
    pub failures: Vec<MigrationFailure>,
}

impl MigrationReport {
    /// Total lines the migration attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.migrated.len() + self.failures.len()
    }

    /// Whether every attempted line made it to the backend.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dual-mode shopping cart.
pub struct CartService<B> {
    backend: Arc<B>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionService<B>>,
    state: Mutex<Cart>,
}

impl<B: Backend> CartService<B> {
    /// Create the cart service, seeding the in-memory snapshot from the
    /// persisted guest cart.
    pub fn new(
        backend: Arc<B>,
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionService<B>>,
    ) -> Self {
        let state = read_json(store.as_ref(), keys::GUEST_CART).unwrap_or_default();
        Self {
            backend,
            store,
            session,
            state: Mutex::new(state),
        }
    }

    /// Resolve which backing is authoritative right now.
    #[must_use]
    pub fn backing(&self) -> CartBacking {
        if self.session.is_logged_in() && self.session.auth_token().is_some() {
            CartBacking::Remote
        } else {
            CartBacking::Guest
        }
    }

    // =========================================================================
    // Synchronous reads (in-memory snapshot)
    // =========================================================================

    /// Snapshot of the current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_state().items().to_vec()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().is_empty()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock_state().item_count()
    }

    /// Cart total in the currency of its first line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lock_state().total()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart, merging with an existing line.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub async fn add_item(&self, product: ProductRef, quantity: u32) {
        match self.backing() {
            CartBacking::Guest => {
                let mut cart = self.lock_state();
                cart.add(product, quantity);
                self.persist_guest(&cart);
            }
            CartBacking::Remote => {
                match self.backend.add_cart_item(product.id, quantity.max(1)).await {
                    Ok(()) => self.refresh_remote().await,
                    Err(err) => {
                        warn!(error = %err, "remote cart add failed, applying in memory only");
                        self.lock_state().add(product, quantity);
                    }
                }
            }
        }
    }

    /// Set the quantity of an existing line. Zero removes the line; an
    /// unknown product is a no-op.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id).await;
            return;
        }

        match self.backing() {
            CartBacking::Guest => {
                let mut cart = self.lock_state();
                cart.set_quantity(product_id, quantity);
                self.persist_guest(&cart);
            }
            CartBacking::Remote => {
                match self.backend.set_cart_quantity(product_id, quantity).await {
                    Ok(()) => self.refresh_remote().await,
                    Err(err) => {
                        warn!(error = %err, "remote quantity update failed, applying in memory only");
                        self.lock_state().set_quantity(product_id, quantity);
                    }
                }
            }
        }
    }

    /// Remove a line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) {
        match self.backing() {
            CartBacking::Guest => {
                let mut cart = self.lock_state();
                cart.remove(product_id);
                self.persist_guest(&cart);
            }
            CartBacking::Remote => match self.backend.remove_cart_item(product_id).await {
                Ok(()) => self.refresh_remote().await,
                Err(err) => {
                    warn!(error = %err, "remote cart remove failed, applying in memory only");
                    self.lock_state().remove(product_id);
                }
            },
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        match self.backing() {
            CartBacking::Guest => {
                self.lock_state().clear();
                self.store.remove(keys::GUEST_CART);
            }
            CartBacking::Remote => match self.backend.clear_cart().await {
                Ok(()) => self.lock_state().clear(),
                Err(err) => {
                    warn!(error = %err, "remote cart clear failed, applying in memory only");
                    self.lock_state().clear();
                }
            },
        }
    }

    /// Re-read the cart from its authoritative backing and return a snapshot.
    ///
    /// When a remote read fails the previous snapshot is kept: a transient
    /// network error must not present the user an empty cart.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Vec<CartItem> {
        match self.backing() {
            CartBacking::Guest => {
                let cart: Cart =
                    read_json(self.store.as_ref(), keys::GUEST_CART).unwrap_or_default();
                *self.lock_state() = cart;
            }
            CartBacking::Remote => self.refresh_remote().await,
        }
        self.items()
    }

    /// Replay the persisted guest cart into the remote cart.
    ///
    /// Intended to run exactly once per guest-to-authenticated transition.
    /// Lines are replayed in insertion order; failures are collected into
    /// the report rather than aborting, and the guest cart key is removed
    /// afterwards either way so the migration cannot run twice.
    #[instrument(skip(self))]
    pub async fn migrate_guest_cart(&self) -> MigrationReport {
        let guest_cart: Cart =
            read_json(self.store.as_ref(), keys::GUEST_CART).unwrap_or_default();

        let mut report = MigrationReport::default();
        for item in guest_cart.items() {
            match self
                .backend
                .add_cart_item(item.product.id, item.quantity)
                .await
            {
                Ok(()) => report.migrated.push(item.product.id),
                Err(err) => {
                    warn!(
                        product_id = %item.product.id,
                        error = %err,
                        "cart line failed to migrate"
                    );
                    report.failures.push(MigrationFailure {
                        item: item.clone(),
                        error: err,
                    });
                }
            }
        }

        self.refresh_remote().await;
        self.store.remove(keys::GUEST_CART);

        debug!(
            migrated = report.migrated.len(),
            failed = report.failures.len(),
            "guest cart migration finished"
        );
        report
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Cart> {
        self.state.lock().expect("cart lock poisoned")
    }

    fn persist_guest(&self, cart: &Cart) {
        write_json(self.store.as_ref(), keys::GUEST_CART, cart);
    }

    async fn refresh_remote(&self) {
        match self.backend.fetch_cart().await {
            Ok(items) => *self.lock_state() = Cart::from_items(items),
            Err(err) => {
                warn!(error = %err, "remote cart fetch failed, keeping previous snapshot");
            }
        }
    }
}
