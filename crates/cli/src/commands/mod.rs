//! CLI command implementations, one module per subcommand group.

pub mod auth;
pub mod cart;
pub mod favorites;
pub mod reviews;
pub mod tickets;
