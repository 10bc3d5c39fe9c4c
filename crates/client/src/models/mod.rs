//! Domain models for the storefront client.

pub mod cart;
pub mod review;
pub mod session;
pub mod ticket;
pub mod user;
