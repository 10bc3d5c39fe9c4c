//! Integration test support for the Mercado storefront client.
//!
//! The backend double here ([`FakeBackend`]) implements the full
//! [`Backend`] trait in memory: real token bookkeeping, per-user carts,
//! favorites, tickets, and reviews, plus failure injection (full outage,
//! per-product rejection, failing reads) so tests can exercise the
//! degraded paths without a network.
//!
//! Tests build a [`StoreContext`] over a `FakeBackend` and an in-memory
//! store and drive it through the public service API only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use mercado_client::backend::{
    AuthSuccess, Backend, BackendError, NewTicket, RegisterRequest,
};
use mercado_client::models::cart::{CartItem, ProductRef};
use mercado_client::models::review::Review;
use mercado_client::models::session::Session;
use mercado_client::models::ticket::Ticket;
use mercado_client::storage::MemoryStore;
use mercado_client::StoreContext;
use mercado_core::{
    AccountStatus, CurrencyCode, Email, EmailVerificationStatus, Price, ProductId, ReviewId,
    TicketId, TicketStatus, UserId,
};

// re-exported so test files need only this crate's prelude
pub use mercado_client::models::ticket::TicketDraft;
pub use mercado_core::TicketType;

/// Build a catalog product for tests.
#[must_use]
pub fn product(id: i64, name: &str, price_cents: i64) -> ProductRef {
    ProductRef {
        id: ProductId::from(id),
        name: name.to_owned(),
        price: Price::new(Decimal::new(price_cents, 2), CurrencyCode::COP),
        image_url: None,
    }
}

/// Build a context over a fresh [`FakeBackend`] and in-memory store.
///
/// The store is returned separately so tests can inspect and corrupt raw
/// keys.
#[must_use]
pub fn test_context() -> (StoreContext<FakeBackend>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new();
    let store_handle: Arc<dyn mercado_client::storage::KeyValueStore> = store.clone();
    let ctx = StoreContext::new(backend, store_handle);
    (ctx, store)
}

struct FakeUser {
    id: UserId,
    display_name: String,
    password: String,
}

#[derive(Default)]
struct FakeState {
    catalog: HashMap<ProductId, ProductRef>,
    users: HashMap<String, FakeUser>,
    next_user_id: i64,
    tokens: HashMap<String, UserId>,
    current_token: Option<String>,
    carts: HashMap<UserId, Vec<CartItem>>,
    favorites: HashMap<UserId, Vec<ProductId>>,
    tickets: HashMap<UserId, Vec<Ticket>>,
    reviews: HashMap<ProductId, Vec<Review>>,
    next_review_id: i64,
    next_ticket_seq: u64,
    // failure injection
    offline: bool,
    fail_cart_fetch: bool,
    fail_ticket_create: bool,
    rejected_products: Vec<ProductId>,
    rejected_ticket_subjects: Vec<String>,
    // call log
    cart_adds: Vec<(ProductId, u32)>,
    login_calls: u32,
    logout_calls: u32,
}

/// In-memory [`Backend`] with failure injection.
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_user_id: 1,
                next_review_id: 1,
                next_ticket_seq: 1,
                ..FakeState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend lock poisoned")
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub fn add_product(&self, product: ProductRef) {
        self.lock().catalog.insert(product.id, product);
    }

    /// Create an account without logging it in.
    pub fn seed_user(&self, email: &str, password: &str, display_name: &str) -> UserId {
        let mut state = self.lock();
        let id = UserId::from(state.next_user_id);
        state.next_user_id += 1;
        state.users.insert(
            email.to_owned(),
            FakeUser {
                id,
                display_name: display_name.to_owned(),
                password: password.to_owned(),
            },
        );
        id
    }

    // =========================================================================
    // Failure injection
    // =========================================================================

    /// Make every call fail with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Make cart reads fail while writes keep working.
    pub fn set_fail_cart_fetch(&self, fail: bool) {
        self.lock().fail_cart_fetch = fail;
    }

    /// Make ticket creation fail.
    pub fn set_fail_ticket_create(&self, fail: bool) {
        self.lock().fail_ticket_create = fail;
    }

    /// Reject this product on every cart add (422), as the backend does for
    /// delisted products.
    pub fn reject_product(&self, product_id: ProductId) {
        self.lock().rejected_products.push(product_id);
    }

    /// Reject any ticket with this subject (422), leaving others accepted.
    pub fn reject_ticket_subject(&self, subject: &str) {
        self.lock().rejected_ticket_subjects.push(subject.to_owned());
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    #[must_use]
    pub fn remote_cart(&self, user_id: UserId) -> Vec<CartItem> {
        self.lock().carts.get(&user_id).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn remote_favorites(&self, user_id: UserId) -> Vec<ProductId> {
        self.lock()
            .favorites
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn remote_tickets(&self, user_id: UserId) -> Vec<Ticket> {
        self.lock()
            .tickets
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every `(product, quantity)` pair that reached `add_cart_item`, in
    /// call order, including rejected ones.
    #[must_use]
    pub fn cart_add_log(&self) -> Vec<(ProductId, u32)> {
        self.lock().cart_adds.clone()
    }

    #[must_use]
    pub fn login_calls(&self) -> u32 {
        self.lock().login_calls
    }

    #[must_use]
    pub fn logout_calls(&self) -> u32 {
        self.lock().logout_calls
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_online(state: &FakeState) -> Result<(), BackendError> {
        if state.offline {
            return Err(BackendError::Connection("backend offline".to_owned()));
        }
        Ok(())
    }

    fn current_user(state: &FakeState) -> Result<UserId, BackendError> {
        state
            .current_token
            .as_ref()
            .and_then(|token| state.tokens.get(token).copied())
            .ok_or(BackendError::Api {
                status: 401,
                message: "missing or invalid token".to_owned(),
            })
    }

    fn issue_token(state: &mut FakeState, email: &str) -> AuthSuccess {
        let user = state.users.get(email).expect("user seeded before token");
        let session = Session {
            user_id: user.id,
            email: Email::parse(email).expect("seeded email is valid"),
            display_name: user.display_name.clone(),
            email_verified: EmailVerificationStatus::Unverified,
            account_status: AccountStatus::Active,
            created_at: Utc::now(),
        };

        let token = format!("tok-{}-{}", user.id, state.tokens.len());
        state.tokens.insert(token.clone(), user.id);

        AuthSuccess {
            session,
            token: SecretString::from(token),
        }
    }
}

impl Backend for FakeBackend {
    fn set_auth_token(&self, token: Option<SecretString>) {
        self.lock().current_token = token.map(|t| t.expose_secret().to_owned());
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthSuccess, BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;

        let email = request.email.as_str().to_owned();
        if state.users.contains_key(&email) {
            return Err(BackendError::Api {
                status: 409,
                message: "email already registered".to_owned(),
            });
        }

        let id = UserId::from(state.next_user_id);
        state.next_user_id += 1;
        state.users.insert(
            email.clone(),
            FakeUser {
                id,
                display_name: request.display_name,
                password: request.password.expose_secret().to_owned(),
            },
        );

        Ok(Self::issue_token(&mut state, &email))
    }

    async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSuccess, BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state.login_calls += 1;

        let credentials_ok = state
            .users
            .get(email.as_str())
            .is_some_and(|user| user.password == password.expose_secret());
        if !credentials_ok {
            return Err(BackendError::Api {
                status: 401,
                message: "invalid credentials".to_owned(),
            });
        }

        Ok(Self::issue_token(&mut state, email.as_str()))
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state.logout_calls += 1;

        if let Some(token) = state.current_token.take() {
            state.tokens.remove(&token);
        }
        Ok(())
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductRef, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;
        state
            .catalog
            .get(&product_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {product_id}")))
    }

    async fn fetch_cart(&self) -> Result<Vec<CartItem>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;
        if state.fail_cart_fetch {
            return Err(BackendError::Connection("cart fetch failed".to_owned()));
        }
        let user_id = Self::current_user(&state)?;
        Ok(state.carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state.cart_adds.push((product_id, quantity));

        let user_id = Self::current_user(&state)?;
        if state.rejected_products.contains(&product_id) {
            return Err(BackendError::Api {
                status: 422,
                message: "product unavailable".to_owned(),
            });
        }
        let product = state
            .catalog
            .get(&product_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {product_id}")))?;

        let cart = state.carts.entry(user_id).or_default();
        if let Some(line) = cart.iter_mut().find(|line| line.product.id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            cart.push(CartItem { product, quantity });
        }
        Ok(())
    }

    async fn set_cart_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;

        let cart = state.carts.entry(user_id).or_default();
        match cart.iter_mut().find(|line| line.product.id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(BackendError::NotFound(format!(
                "product {product_id} not in cart"
            ))),
        }
    }

    async fn remove_cart_item(&self, product_id: ProductId) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;
        state
            .carts
            .entry(user_id)
            .or_default()
            .retain(|line| line.product.id != product_id);
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;
        state.carts.remove(&user_id);
        Ok(())
    }

    async fn add_favorite(&self, product_id: ProductId) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;
        let favorites = state.favorites.entry(user_id).or_default();
        if !favorites.contains(&product_id) {
            favorites.push(product_id);
        }
        Ok(())
    }

    async fn remove_favorite(&self, product_id: ProductId) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;
        state
            .favorites
            .entry(user_id)
            .or_default()
            .retain(|id| *id != product_id);
        Ok(())
    }

    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;
        Ok(state.tickets.get(&user_id).cloned().unwrap_or_default())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        if state.fail_ticket_create {
            return Err(BackendError::Connection("ticket service down".to_owned()));
        }
        if state.rejected_ticket_subjects.contains(&ticket.subject) {
            return Err(BackendError::Api {
                status: 422,
                message: "ticket rejected".to_owned(),
            });
        }
        let user_id = Self::current_user(&state)?;

        let seq = state.next_ticket_seq;
        state.next_ticket_seq += 1;

        // The backend assigns its own identity and number.
        let canonical = Ticket {
            id: TicketId::generate(),
            ticket_number: format!("PQRS-SRV-{seq:06}"),
            ticket_type: ticket.ticket_type,
            subject: ticket.subject,
            description: ticket.description,
            status: TicketStatus::Open,
            created_at: ticket.created_at,
            updated_at: Utc::now(),
        };
        state
            .tickets
            .entry(user_id)
            .or_default()
            .push(canonical.clone());
        Ok(canonical)
    }

    async fn fetch_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.reviews.get(&product_id).cloned().unwrap_or_default())
    }

    async fn create_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        let user_id = Self::current_user(&state)?;

        let author = state
            .users
            .values()
            .find(|user| user.id == user_id)
            .map_or_else(|| "anonymous".to_owned(), |u| u.display_name.clone());

        let review = Review {
            id: ReviewId::from(state.next_review_id),
            product_id,
            rating,
            comment: comment.to_owned(),
            author,
            created_at: Utc::now(),
        };
        state.next_review_id += 1;
        state
            .reviews
            .entry(product_id)
            .or_default()
            .push(review.clone());
        Ok(review)
    }
}
