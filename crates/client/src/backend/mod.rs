//! Remote backend boundary.
//!
//! # Architecture
//!
//! - All remote operations go through the [`Backend`] trait so the services
//!   never touch HTTP directly and tests can run against an in-memory double.
//! - The production implementation is [`HttpBackend`]: plain REST over
//!   `reqwest`, JSON bodies, bearer-token auth, `moka` read cache for the
//!   product catalog.
//! - Wire DTOs live in [`dto`]; backend field-naming drift (the legacy API
//!   speaks Spanish, e.g. `id_producto`) is absorbed there and nowhere else.

pub mod dto;
mod http;

pub use http::HttpBackend;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;

use mercado_core::{Email, ProductId, TicketId, TicketType};

use crate::models::cart::{CartItem, ProductRef};
use crate::models::review::Review;
use crate::models::session::Session;
use crate::models::ticket::Ticket;

/// Errors that can occur when talking to the Mercado backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure not tied to an HTTP response (also used by
    /// in-memory test backends to simulate outages).
    #[error("could not connect: {0}")]
    Connection(String),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the request.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, when present.
        message: String,
    },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Whether this error means the backend was unreachable (as opposed to
    /// reachable-but-rejecting). Drives the generic "could not connect"
    /// user-facing message.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }

    /// Whether the backend rejected the caller's credentials or input
    /// (4xx-class rejection rather than an outage).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Registration request payload.
pub struct RegisterRequest {
    /// Validated email address.
    pub email: Email,
    /// Plaintext password; hashing happens server-side.
    pub password: SecretString,
    /// Name shown in the UI.
    pub display_name: String,
}

/// Successful authentication: the new session plus its bearer token.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    /// The authenticated identity.
    pub session: Session,
    /// Bearer token for subsequent authenticated calls.
    pub token: SecretString,
}

/// A ticket as submitted to the backend.
///
/// Carries the client-generated identity and provisional number so guest
/// tickets survive migration; the backend may replace both in its response.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Client-generated ticket ID.
    pub client_id: TicketId,
    /// Provisional display number.
    pub ticket_number: String,
    /// PQRS category.
    pub ticket_type: TicketType,
    /// Short subject line.
    pub subject: String,
    /// Full description.
    pub description: String,
    /// Client-side creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&Ticket> for NewTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            client_id: ticket.id,
            ticket_number: ticket.ticket_number.clone(),
            ticket_type: ticket.ticket_type,
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            created_at: ticket.created_at,
        }
    }
}

/// Remote operations the storefront needs.
///
/// Methods that mutate per-user state (cart, favorites, tickets, reviews)
/// require an auth token to have been installed via [`set_auth_token`];
/// without one the backend answers with a 401-class [`BackendError::Api`].
///
/// [`set_auth_token`]: Backend::set_auth_token
#[allow(async_fn_in_trait)]
pub trait Backend: Send + Sync {
    /// Install (or clear) the bearer token attached to authenticated calls.
    fn set_auth_token(&self, token: Option<SecretString>);

    /// Create an account and log it in.
    async fn register(&self, request: RegisterRequest) -> Result<AuthSuccess, BackendError>;

    /// Authenticate with email and password.
    async fn login(&self, email: &Email, password: &SecretString)
    -> Result<AuthSuccess, BackendError>;

    /// Invalidate the current token server-side.
    async fn logout(&self) -> Result<(), BackendError>;

    /// Fetch one product.
    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductRef, BackendError>;

    /// Fetch the authenticated user's cart.
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, BackendError>;

    /// Add `quantity` units of a product to the remote cart.
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    /// Set the quantity of a product already in the remote cart.
    async fn set_cart_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    /// Remove a product from the remote cart.
    async fn remove_cart_item(&self, product_id: ProductId) -> Result<(), BackendError>;

    /// Empty the remote cart.
    async fn clear_cart(&self) -> Result<(), BackendError>;

    /// Mirror a favorite onto the backend.
    async fn add_favorite(&self, product_id: ProductId) -> Result<(), BackendError>;

    /// Remove a mirrored favorite from the backend.
    async fn remove_favorite(&self, product_id: ProductId) -> Result<(), BackendError>;

    /// Fetch the authenticated user's tickets.
    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, BackendError>;

    /// Create a ticket; the backend may assign its own canonical number.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, BackendError>;

    /// Fetch reviews for a product (available to guests).
    async fn fetch_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, BackendError>;

    /// Submit a review for a product.
    async fn create_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, BackendError>;
}
