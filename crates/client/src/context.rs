//! Store context: the composition root of the client.
//!
//! `StoreContext` constructs every service exactly once over a shared
//! backend and local store, and owns the guest-to-authenticated transition
//! sequence so the one-time side effects (guest-cart migration, pending
//! favorite sync) run at most once per transition, in a fixed order.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::backend::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::session::Session;
use crate::models::user::RegistrationForm;
use crate::services::cart::{CartService, MigrationReport};
use crate::services::favorites::FavoritesService;
use crate::services::reviews::ReviewService;
use crate::services::session::SessionService;
use crate::services::tickets::TicketService;
use crate::storage::KeyValueStore;

/// What a successful login or registration produced.
#[derive(Debug)]
pub struct LoginOutcome {
    /// The established session.
    pub session: Session,
    /// Result of replaying the guest cart into the backend. Empty when the
    /// user had no guest cart.
    pub cart_migration: MigrationReport,
}

/// Shared handle to every storefront service.
pub struct StoreContext<B> {
    backend: Arc<B>,
    session: Arc<SessionService<B>>,
    cart: Arc<CartService<B>>,
    favorites: Arc<FavoritesService<B>>,
    tickets: Arc<TicketService<B>>,
    reviews: Arc<ReviewService<B>>,
}

impl StoreContext<HttpBackend> {
    /// Build a context over the production HTTP backend.
    #[must_use]
    pub fn from_config(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(HttpBackend::new(config), store)
    }
}

impl<B: Backend> StoreContext<B> {
    /// Build a context over any backend. Used directly by tests with an
    /// in-memory backend.
    pub fn new(backend: B, store: Arc<dyn KeyValueStore>) -> Self {
        let backend = Arc::new(backend);
        let session = Arc::new(SessionService::new(
            Arc::clone(&backend),
            Arc::clone(&store),
        ));
        let cart = Arc::new(CartService::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            Arc::clone(&session),
        ));
        let favorites = Arc::new(FavoritesService::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            Arc::clone(&session),
        ));
        let tickets = Arc::new(TicketService::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            Arc::clone(&session),
        ));
        let reviews = Arc::new(ReviewService::new(Arc::clone(&backend), Arc::clone(&session)));

        Self {
            backend,
            session,
            cart,
            favorites,
            tickets,
            reviews,
        }
    }

    // =========================================================================
    // Service accessors
    // =========================================================================

    /// The shared backend client. Mainly for catalog reads that no service
    /// wraps, like fetching a product before adding it to the cart.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn session(&self) -> &SessionService<B> {
        &self.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartService<B> {
        &self.cart
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesService<B> {
        &self.favorites
    }

    #[must_use]
    pub fn tickets(&self) -> &TicketService<B> {
        &self.tickets
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewService<B> {
        &self.reviews
    }

    // =========================================================================
    // Authentication flows
    // =========================================================================

    /// Log in and run the guest-to-authenticated transition sequence.
    ///
    /// On success the guest cart is replayed into the backend cart and any
    /// pending favorite is consumed, in that order. A failed login performs
    /// neither.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::services::session::AuthError`] from the session
    /// service; transition side effects never fail the login itself.
    #[instrument(skip(self, password), fields(email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let session = self.session.login(email, password).await?;
        info!(user_id = %session.user_id, "login succeeded, migrating guest state");

        let cart_migration = self.cart.migrate_guest_cart().await;
        self.favorites.sync_pending().await;

        Ok(LoginOutcome {
            session,
            cart_migration,
        })
    }

    /// Register a new account and run the same transition sequence as
    /// [`Self::login`].
    ///
    /// # Errors
    ///
    /// Propagates validation and backend errors from registration.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: RegistrationForm) -> Result<LoginOutcome> {
        let session = self.session.register(form).await?;
        info!(user_id = %session.user_id, "registration succeeded, migrating guest state");

        let cart_migration = self.cart.migrate_guest_cart().await;
        self.favorites.sync_pending().await;

        Ok(LoginOutcome {
            session,
            cart_migration,
        })
    }

    /// Log out. Local state is cleared even when the backend call fails.
    pub async fn logout(&self) {
        self.session.logout().await;
    }
}
