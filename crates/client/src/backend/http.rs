//! REST client for the Mercado backend.
//!
//! Plain JSON over `reqwest` with bearer-token auth and a `moka` read cache
//! for the product catalog (5-minute TTL). Cart, ticket, and review calls
//! are never cached: they are mutable per-user state.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use mercado_core::{Email, ProductId};

use crate::config::ClientConfig;
use crate::models::cart::{CartItem, ProductRef};
use crate::models::review::Review;
use crate::models::ticket::Ticket;

use super::dto::{
    AuthResponseBody, CartBody, CartLineInputBody, ErrorBody, LoginBody, ProductBody,
    RegisterBody, ReviewBody, ReviewCreateBody, TicketBody, TicketCreateBody, convert_cart,
    convert_product, convert_review, convert_session, convert_ticket,
};
use super::{AuthSuccess, Backend, BackendError, NewTicket, RegisterRequest};

/// Product cache capacity.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;
/// Product cache TTL.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: url::Url,
    timeout: Duration,
    token: RwLock<Option<SecretString>>,
    products: Cache<ProductId, ProductRef>,
}

impl HttpBackend {
    /// Create a backend client from configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(HttpBackendInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                timeout: config.timeout,
                token: RwLock::new(None),
                products,
            }),
        }
    }

    /// Drop a product from the read cache.
    pub async fn invalidate_product(&self, product_id: ProductId) {
        self.inner.products.invalidate(&product_id).await;
    }

    fn builder(
        &self,
        method: Method,
        path: &str,
        requires_auth: bool,
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.inner.base_url.join(path)?;
        let mut request = self
            .inner
            .client
            .request(method, url)
            .timeout(self.inner.timeout);

        if requires_auth
            && let Some(token) = self
                .inner
                .token
                .read()
                .expect("token lock poisoned")
                .as_ref()
        {
            request = request.bearer_auth(token.expose_secret());
        }

        Ok(request)
    }

    /// Check the response status, mapping failures to [`BackendError`].
    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        if status.is_success() {
            return Ok(response);
        }

        // Read the body as text for error diagnostics; the backend wraps
        // errors in a JSON envelope but is not perfectly consistent about it.
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "request failed".to_owned());

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(message));
        }

        debug!(status = %status, message = %message, "backend rejected request");
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and decode a JSON response body.
    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        let response = Self::check(request.send().await?).await?;
        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    body = %text.chars().take(500).collect::<String>(),
                    "failed to parse backend response"
                );
                Err(BackendError::Parse(err))
            }
        }
    }

    /// Send a request, caring only that it succeeded.
    async fn submit(request: RequestBuilder) -> Result<(), BackendError> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    fn post_json<B: Serialize>(
        &self,
        path: &str,
        requires_auth: bool,
        body: &B,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self.builder(Method::POST, path, requires_auth)?.json(body))
    }
}

impl Backend for HttpBackend {
    fn set_auth_token(&self, token: Option<SecretString>) {
        *self.inner.token.write().expect("token lock poisoned") = token;
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<AuthSuccess, BackendError> {
        let body = RegisterBody {
            email: request.email.as_str(),
            password: request.password.expose_secret(),
            display_name: &request.display_name,
        };
        let response: AuthResponseBody =
            Self::fetch(self.post_json("auth/register", false, &body)?).await?;

        Ok(AuthSuccess {
            session: convert_session(response.user),
            token: SecretString::from(response.token),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSuccess, BackendError> {
        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: AuthResponseBody =
            Self::fetch(self.post_json("auth/login", false, &body)?).await?;

        Ok(AuthSuccess {
            session: convert_session(response.user),
            token: SecretString::from(response.token),
        })
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), BackendError> {
        Self::submit(self.builder(Method::POST, "auth/logout", true)?).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductRef, BackendError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("cache hit for product");
            return Ok(product);
        }

        let body: ProductBody =
            Self::fetch(self.builder(Method::GET, &format!("products/{product_id}"), false)?)
                .await?;
        let product = convert_product(body);

        self.inner
            .products
            .insert(product_id, product.clone())
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, BackendError> {
        let body: CartBody = Self::fetch(self.builder(Method::GET, "cart", true)?).await?;
        Ok(convert_cart(body))
    }

    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let body = CartLineInputBody {
            product_id,
            quantity,
        };
        Self::submit(self.post_json("cart/items", true, &body)?).await
    }

    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    async fn set_cart_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let body = CartLineInputBody {
            product_id,
            quantity,
        };
        let request = self
            .builder(Method::PUT, &format!("cart/items/{product_id}"), true)?
            .json(&body);
        Self::submit(request).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_cart_item(&self, product_id: ProductId) -> Result<(), BackendError> {
        Self::submit(self.builder(Method::DELETE, &format!("cart/items/{product_id}"), true)?)
            .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), BackendError> {
        Self::submit(self.builder(Method::DELETE, "cart", true)?).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_favorite(&self, product_id: ProductId) -> Result<(), BackendError> {
        Self::submit(self.builder(Method::POST, &format!("favorites/{product_id}"), true)?).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_favorite(&self, product_id: ProductId) -> Result<(), BackendError> {
        Self::submit(self.builder(Method::DELETE, &format!("favorites/{product_id}"), true)?)
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_tickets(&self) -> Result<Vec<Ticket>, BackendError> {
        let body: Vec<TicketBody> =
            Self::fetch(self.builder(Method::GET, "tickets", true)?).await?;
        Ok(body.into_iter().map(convert_ticket).collect())
    }

    #[instrument(skip(self, ticket), fields(ticket_number = %ticket.ticket_number))]
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, BackendError> {
        let body = TicketCreateBody::from_new_ticket(&ticket);
        let response: TicketBody = Self::fetch(self.post_json("tickets", true, &body)?).await?;
        Ok(convert_ticket(response))
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn fetch_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, BackendError> {
        let body: Vec<ReviewBody> = Self::fetch(self.builder(
            Method::GET,
            &format!("products/{product_id}/reviews"),
            false,
        )?)
        .await?;
        Ok(body.into_iter().map(convert_review).collect())
    }

    #[instrument(skip(self, comment), fields(product_id = %product_id, rating))]
    async fn create_review(
        &self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, BackendError> {
        let body = ReviewCreateBody { rating, comment };
        let response: ReviewBody = Self::fetch(self.post_json(
            &format!("products/{product_id}/reviews"),
            true,
            &body,
        )?)
        .await?;
        Ok(convert_review(response))
    }
}
