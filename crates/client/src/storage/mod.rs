//! Local key-value storage boundary.
//!
//! Mirrors the shape of browser `localStorage`: synchronous, string-keyed,
//! string-valued, origin-scoped. Everything the client persists locally goes
//! through [`KeyValueStore`], so tests can swap in [`MemoryStore`] and the
//! CLI uses [`JsonFileStore`].
//!
//! Corruption policy: a value that fails to deserialize is treated as absent.
//! A parse error must never reach a caller as an error - the worst outcome of
//! a damaged store is empty state.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Synchronous string key-value store.
///
/// Implementations must tolerate concurrent calls from multiple handles; the
/// store is a shared mutable cell with no cross-key transactions. Callers
/// deriving new state from stored state must re-read before writing.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key` and its value, if present.
    fn remove(&self, key: &str);
}

/// Fixed storage keys.
///
/// One-shot "pending" sentinels represent an intent recorded while anonymous
/// and fulfilled on the next successful login or registration.
pub mod keys {
    use mercado_core::UserId;

    /// Key for the current authenticated session.
    pub const CURRENT_SESSION: &str = "mercado.session";

    /// Key for the bearer token backing the current session.
    pub const AUTH_TOKEN: &str = "mercado.auth_token";

    /// Key for the locally cached directory of known users.
    pub const USERS_CACHE: &str = "mercado.users";

    /// Key for the guest-mode cart.
    pub const GUEST_CART: &str = "mercado.cart";

    /// Key for the guest-mode PQRS ticket list.
    pub const TICKETS: &str = "mercado.tickets";

    /// One-shot sentinel: product a guest tried to favorite.
    pub const PENDING_FAVORITE: &str = "mercado.pending_favorite";

    /// One-shot sentinel: email captured before authentication (form prefill).
    pub const PENDING_EMAIL: &str = "mercado.pending_email";

    /// Per-user favorites key.
    #[must_use]
    pub fn favorites_for(user_id: UserId) -> String {
        format!("mercado.favorites.{user_id}")
    }
}

/// Read and deserialize a JSON value from the store.
///
/// Returns `None` when the key is absent or holds corrupt JSON. Corruption is
/// logged at debug level and otherwise indistinguishable from absence.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(key, error = %err, "ignoring corrupt JSON in local store");
            None
        }
    }
}

/// Serialize and write a JSON value to the store.
///
/// Serialization failures are logged and dropped; the store never surfaces
/// errors to business logic.
pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => {
            tracing::error!(key, error = %err, "failed to serialize value for local store");
        }
    }
}
