//! Storefront services.
//!
//! Each service owns one slice of client state and implements the
//! guest/authenticated dual-mode pattern where the slice has both a local
//! and a remote backing. Services are constructed once by
//! [`crate::context::StoreContext`] and shared.

pub mod cart;
pub mod favorites;
pub mod reviews;
pub mod session;
pub mod tickets;
