//! Mercado Core - Shared types library.
//!
//! This crate provides common types used across all Mercado components:
//! - `client` - Storefront client library (session, cart, favorites, PQRS)
//! - `cli` - Command-line shopping client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
