//! Favorites service.
//!
//! Favorites are per-user product-id lists keyed by user id in the local
//! store, which stays authoritative; the backend is mirrored best-effort so
//! a network failure never loses a favorite.
//!
//! A guest tapping "favorite" has no user to attach the favorite to, so the
//! intent is parked as a pending sentinel and consumed exactly once after
//! the next successful authentication.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use mercado_core::ProductId;

use crate::backend::Backend;
use crate::services::session::SessionService;
use crate::storage::{KeyValueStore, keys, read_json, write_json};

/// Per-user favorites with a guest pending sentinel.
pub struct FavoritesService<B> {
    backend: Arc<B>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionService<B>>,
}

impl<B: Backend> FavoritesService<B> {
    pub fn new(
        backend: Arc<B>,
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionService<B>>,
    ) -> Self {
        Self {
            backend,
            store,
            session,
        }
    }

    /// Favorites of the current user, in the order they were added.
    /// Empty when no session exists.
    #[must_use]
    pub fn list(&self) -> Vec<ProductId> {
        self.session
            .current_session()
            .map(|session| self.read_for(&keys::favorites_for(session.user_id)))
            .unwrap_or_default()
    }

    /// Whether the current user has favorited this product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.list().contains(&product_id)
    }

    /// Add a product to the current user's favorites.
    ///
    /// Without a session this is a no-op; callers wanting to capture guest
    /// intent use [`Self::mark_pending`] instead. Adding a product that is
    /// already favorited changes nothing.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId) {
        let Some(session) = self.session.current_session() else {
            debug!("favorite add without session ignored");
            return;
        };

        let key = keys::favorites_for(session.user_id);
        let mut favorites = self.read_for(&key);
        if !favorites.contains(&product_id) {
            favorites.push(product_id);
            write_json(self.store.as_ref(), &key, &favorites);
        }

        self.mirror_remote(product_id, true).await;
    }

    /// Remove a product from the current user's favorites.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: ProductId) {
        let Some(session) = self.session.current_session() else {
            debug!("favorite remove without session ignored");
            return;
        };

        let key = keys::favorites_for(session.user_id);
        let mut favorites = self.read_for(&key);
        let before = favorites.len();
        favorites.retain(|id| *id != product_id);
        if favorites.len() != before {
            write_json(self.store.as_ref(), &key, &favorites);
        }

        self.mirror_remote(product_id, false).await;
    }

    /// Park a guest's favorite intent until the next authentication.
    ///
    /// Only one sentinel is kept; a later call overwrites an earlier one.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn mark_pending(&self, product_id: ProductId) {
        write_json(self.store.as_ref(), keys::PENDING_FAVORITE, &product_id);
    }

    /// The parked favorite intent, if any.
    #[must_use]
    pub fn pending(&self) -> Option<ProductId> {
        read_json(self.store.as_ref(), keys::PENDING_FAVORITE)
    }

    /// Consume the pending sentinel into the current user's favorites.
    ///
    /// Without a session the sentinel stays parked. With one, the product
    /// is added and the sentinel removed, so a second call is a no-op.
    #[instrument(skip(self))]
    pub async fn sync_pending(&self) {
        let Some(product_id): Option<ProductId> =
            read_json(self.store.as_ref(), keys::PENDING_FAVORITE)
        else {
            return;
        };

        if self.session.is_logged_in() {
            debug!(product_id = %product_id, "consuming pending favorite");
            self.add(product_id).await;
            self.store.remove(keys::PENDING_FAVORITE);
        }
    }

    fn read_for(&self, key: &str) -> Vec<ProductId> {
        read_json(self.store.as_ref(), key).unwrap_or_default()
    }

    /// Mirror a favorite change to the backend. Failures are logged only;
    /// the local list already holds the truth.
    async fn mirror_remote(&self, product_id: ProductId, added: bool) {
        if self.session.auth_token().is_none() {
            return;
        }

        let result = if added {
            self.backend.add_favorite(product_id).await
        } else {
            self.backend.remove_favorite(product_id).await
        };

        if let Err(err) = result {
            warn!(product_id = %product_id, error = %err, "favorite mirror to backend failed");
        }
    }
}
