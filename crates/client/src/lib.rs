//! Mercado Client - Storefront client library.
//!
//! A thin client over the Mercado REST backend with a local key-value store
//! used as an offline/guest-mode cache. Covers session management, the cart,
//! favorites, PQRS ticketing, and product reviews.
//!
//! # Architecture
//!
//! - The remote backend sits behind the [`backend::Backend`] trait; the
//!   production implementation is [`backend::HttpBackend`] (`reqwest`, JSON,
//!   bearer-token auth).
//! - Durable local state sits behind [`storage::KeyValueStore`] (string key →
//!   string value, the shape of browser `localStorage`). Corrupt JSON under
//!   any key is treated as absent, never as an error.
//! - Services implement the guest/authenticated dual-mode reconciliation
//!   protocol: local store authoritative for guests, backend authoritative
//!   once a session and auth token exist, with a one-time migration of
//!   guest-held state at the transition.
//! - [`context::StoreContext`] is the composition root. It constructs every
//!   service exactly once and orchestrates the login side-effect sequence
//!   (cart migration, pending-favorite sync) at most once per transition.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mercado_client::config::ClientConfig;
//! use mercado_client::context::StoreContext;
//! use mercado_client::storage::JsonFileStore;
//!
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(JsonFileStore::open("state.json")?);
//! let ctx = StoreContext::from_config(&config, store);
//!
//! // Guest cart lives in the local store...
//! ctx.cart().add_item(product, 2).await;
//!
//! // ...and is replayed into the backend cart on login.
//! let outcome = ctx.login("ana@example.com", "hunter2!").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use backend::{Backend, BackendError, HttpBackend};
pub use config::ClientConfig;
pub use context::{LoginOutcome, StoreContext};
pub use error::ClientError;
pub use models::cart::{Cart, CartItem, ProductRef};
pub use models::session::Session;
pub use models::ticket::{Ticket, TicketDraft};
pub use services::cart::{CartBacking, CartService, MigrationReport};
pub use services::favorites::FavoritesService;
pub use services::reviews::ReviewService;
pub use services::session::{AuthError, ListenerHandle, SessionService};
pub use services::tickets::{TicketMigrationReport, TicketService};
