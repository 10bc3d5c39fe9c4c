//! Unified error handling for the storefront client.
//!
//! Services return boundary-specific errors ([`BackendError`],
//! [`AuthError`]); `ClientError` is the aggregate a UI layer deals with.
//! Nothing in this crate is fatal: every error maps to a message a user can
//! act on, and raw server internals never reach the end user.

use thiserror::Error;

use crate::backend::BackendError;
use crate::services::session::AuthError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input rejected before any network or storage call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation requires an active session.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// User-facing message. Never exposes server internals.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(err) => {
                if err.is_unreachable() {
                    "Could not connect. Please try again.".to_owned()
                } else {
                    "Something went wrong. Please try again.".to_owned()
                }
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Email or password is incorrect.".to_owned(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists.".to_owned()
                }
                AuthError::InvalidEmail(_) => "Please enter a valid email address.".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::MissingField(field) => format!("Please fill in: {field}."),
                AuthError::Backend(inner) if inner.is_unreachable() => {
                    "Could not connect. Please try again.".to_owned()
                }
                AuthError::Backend(_) => "Something went wrong. Please try again.".to_owned(),
            },
            Self::Validation(msg) => msg.clone(),
            Self::NotAuthenticated => "Please log in first.".to_owned(),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_get_generic_message() {
        let err = ClientError::Backend(BackendError::Connection("refused".to_owned()));
        assert_eq!(err.user_message(), "Could not connect. Please try again.");
    }

    #[test]
    fn test_server_message_not_leaked() {
        let err = ClientError::Backend(BackendError::Api {
            status: 500,
            message: "panic at row 17 of orders.rs".to_owned(),
        });
        assert!(!err.user_message().contains("orders.rs"));
    }

    #[test]
    fn test_invalid_credentials_message() {
        let err = ClientError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.user_message(), "Email or password is incorrect.");
    }
}
