//! Session service.
//!
//! Owns the current-session state: registration, login, logout, and the
//! auth-change listener fan-out that drives the rest of the client between
//! guest and authenticated mode.
//!
//! State machine: {Anonymous, Authenticated}. `register`/`login` success
//! moves to Authenticated, `logout` to Anonymous. A failed login or
//! registration leaves the state untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use mercado_core::{Email, EmailError};

use crate::backend::{AuthSuccess, Backend, BackendError, RegisterRequest};
use crate::models::session::Session;
use crate::models::user::{MIN_PASSWORD_LENGTH, RegistrationForm, UserSummary};
use crate::storage::{KeyValueStore, keys, read_json, write_json};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password or unknown email - the backend's
    /// rejection is deliberately not distinguished, to avoid enumeration).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required field is empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Backend error not attributable to the caller's input.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Handle returned by [`SessionService::subscribe`]; pass it back to
/// [`SessionService::unsubscribe`] to remove exactly that listener.
#[derive(Debug, PartialEq, Eq)]
pub struct ListenerHandle(u64);

type AuthListener = Box<dyn FnMut(bool) + Send>;

/// Listener storage. Callbacks are invoked with the lock released, so a
/// callback may subscribe or unsubscribe; `dropped_mid_notify` records
/// removals that target an entry currently out on loan to `notify`.
#[derive(Default)]
struct ListenerRegistry {
    entries: Vec<(u64, AuthListener)>,
    dropped_mid_notify: Vec<u64>,
    notifying: bool,
}

/// Session/identity manager.
pub struct SessionService<B> {
    backend: Arc<B>,
    store: Arc<dyn KeyValueStore>,
    listeners: Mutex<ListenerRegistry>,
    next_listener_id: AtomicU64,
}

impl<B: Backend> SessionService<B> {
    /// Create the session service.
    ///
    /// Restores a persisted auth token into the backend client so a session
    /// survives process restarts.
    pub fn new(backend: Arc<B>, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(token) = store.get(keys::AUTH_TOKEN) {
            backend.set_auth_token(Some(SecretString::from(token)));
        }

        Self {
            backend,
            store,
            listeners: Mutex::new(ListenerRegistry::default()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    /// The current session, if one exists.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        read_json(self.store.as_ref(), keys::CURRENT_SESSION)
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_session().is_some()
    }

    /// The persisted bearer token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<SecretString> {
        self.store.get(keys::AUTH_TOKEN).map(SecretString::from)
    }

    /// Locally cached user directory. Corrupt cache reads as empty.
    #[must_use]
    pub fn cached_users(&self) -> Vec<UserSummary> {
        read_json(self.store.as_ref(), keys::USERS_CACHE).unwrap_or_default()
    }

    /// Email captured before authentication (form prefill), if any.
    #[must_use]
    pub fn pending_email(&self) -> Option<String> {
        self.store.get(keys::PENDING_EMAIL)
    }

    /// Record an email to prefill the next login/registration form.
    pub fn set_pending_email(&self, email: &str) {
        self.store.set(keys::PENDING_EMAIL, email);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Register a new account and establish its session.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call when the form is
    /// malformed, `AuthError::UserAlreadyExists` when the backend reports a
    /// duplicate email, and `AuthError::Backend` otherwise.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: RegistrationForm) -> Result<Session, AuthError> {
        let (email, display_name) = validate_registration(&form)?;

        let request = RegisterRequest {
            email,
            password: form.password,
            display_name,
        };

        let auth = self.backend.register(request).await.map_err(|err| match err {
            BackendError::Api { status: 409, .. } => AuthError::UserAlreadyExists,
            other => AuthError::Backend(other),
        })?;

        Ok(self.establish(auth))
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Any backend rejection of the credentials maps to
    /// `AuthError::InvalidCredentials`; whether the email exists is not
    /// revealed. Transport failures map to `AuthError::Backend`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;
        let password = SecretString::from(password.to_owned());

        let auth = self
            .backend
            .login(&email, &password)
            .await
            .map_err(|err| {
                if err.is_rejection() {
                    AuthError::InvalidCredentials
                } else {
                    AuthError::Backend(err)
                }
            })?;

        Ok(self.establish(auth))
    }

    /// End the current session.
    ///
    /// Always succeeds locally: the remote logout call is best-effort, and
    /// local session state is cleared regardless of its outcome.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let had_session = self.is_logged_in();

        if self.auth_token().is_some()
            && let Err(err) = self.backend.logout().await
        {
            warn!(error = %err, "remote logout failed, clearing local session anyway");
        }

        self.store.remove(keys::CURRENT_SESSION);
        self.store.remove(keys::AUTH_TOKEN);
        self.backend.set_auth_token(None);

        if had_session {
            self.notify(false);
        }
    }

    /// Persist the authenticated session and fan out the state change.
    fn establish(&self, auth: AuthSuccess) -> Session {
        let session = auth.session;

        write_json(self.store.as_ref(), keys::CURRENT_SESSION, &session);
        self.store
            .set(keys::AUTH_TOKEN, auth.token.expose_secret());
        self.backend.set_auth_token(Some(auth.token));

        self.upsert_cached_user(&session);
        self.store.remove(keys::PENDING_EMAIL);

        self.notify(true);
        session
    }

    /// Re-read, update, and write back the cached user directory.
    fn upsert_cached_user(&self, session: &Session) {
        let mut users = self.cached_users();
        if !users.iter().any(|u| u.id == session.user_id) {
            users.push(UserSummary {
                id: session.user_id,
                email: session.email.clone(),
                display_name: session.display_name.clone(),
            });
            write_json(self.store.as_ref(), keys::USERS_CACHE, &users);
        }
    }

    // =========================================================================
    // Auth-change notifications
    // =========================================================================

    /// Subscribe to auth-state transitions.
    ///
    /// The callback is invoked synchronously with the new logged-in state on
    /// every transition. Subscribing from inside a callback is allowed; the
    /// new listener first fires on the next transition.
    pub fn subscribe(&self, callback: impl FnMut(bool) + Send + 'static) -> ListenerHandle {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .entries
            .push((id, Box::new(callback)));
        ListenerHandle(id)
    }

    /// Remove exactly the listener identified by `handle`. May be called
    /// from inside a listener callback, including on the callback's own
    /// handle.
    pub fn unsubscribe(&self, handle: ListenerHandle) {
        let mut registry = self.listeners.lock().expect("listener lock poisoned");
        if registry.notifying {
            registry.dropped_mid_notify.push(handle.0);
        }
        registry.entries.retain(|(id, _)| *id != handle.0);
    }

    fn notify(&self, logged_in: bool) {
        debug!(logged_in, "auth state changed");

        // Take the entries out so callbacks run without the lock held and
        // can reach back into subscribe/unsubscribe.
        let mut active = {
            let mut registry = self.listeners.lock().expect("listener lock poisoned");
            registry.notifying = true;
            std::mem::take(&mut registry.entries)
        };

        for (_, callback) in &mut active {
            callback(logged_in);
        }

        let mut registry = self.listeners.lock().expect("listener lock poisoned");
        registry.notifying = false;
        let dropped = std::mem::take(&mut registry.dropped_mid_notify);
        active.retain(|(id, _)| !dropped.contains(id));
        // entries holds whatever the callbacks subscribed meanwhile
        active.append(&mut registry.entries);
        registry.entries = active;
    }
}

/// Validate the registration form before any network call.
fn validate_registration(form: &RegistrationForm) -> Result<(Email, String), AuthError> {
    let email = Email::parse(&form.email)?;

    let display_name = form.display_name.trim();
    if display_name.is_empty() {
        return Err(AuthError::MissingField("display name"));
    }

    if form.password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    Ok((email, display_name.to_owned()))
}
