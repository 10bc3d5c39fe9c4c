//! Session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::{AccountStatus, Email, EmailVerificationStatus, UserId};

/// The current authenticated identity.
///
/// Created on login/registration success, destroyed on logout, persisted
/// under [`crate::storage::keys::CURRENT_SESSION`]. At most one session
/// exists per store.
///
/// Deliberately carries no credential material: the bearer token lives under
/// its own key and the password never leaves the login call, so serializing
/// a `Session` can never leak either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user ID.
    pub user_id: UserId,
    /// Account email address.
    pub email: Email,
    /// Name shown in the UI.
    pub display_name: String,
    /// Email verification state.
    pub email_verified: EmailVerificationStatus,
    /// Account standing.
    pub account_status: AccountStatus,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
