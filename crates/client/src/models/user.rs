//! Registration input and locally cached user directory entries.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use mercado_core::{Email, UserId};

/// Minimum password length accepted client-side.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw registration form input, validated by the session service before any
/// network call.
///
/// Implements `Debug` manually so the password can never land in logs.
pub struct RegistrationForm {
    /// Email address as typed.
    pub email: String,
    /// Chosen password.
    pub password: SecretString,
    /// Name shown in the UI.
    pub display_name: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Entry in the locally cached user directory.
///
/// The cache exists so account pickers can render without a network round
/// trip; it carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Backend user ID.
    pub id: UserId,
    /// Account email.
    pub email: Email,
    /// Name shown in the UI.
    pub display_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let form = RegistrationForm {
            email: "ana@example.com".to_owned(),
            password: SecretString::from("hunter2hunter2"),
            display_name: "Ana".to_owned(),
        };
        let debug = format!("{form:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
