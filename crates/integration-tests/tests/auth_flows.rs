//! End-to-end authentication flows against the in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;

use mercado_client::ClientError;
use mercado_client::models::user::RegistrationForm;
use mercado_client::services::session::{AuthError, ListenerHandle, SessionService};
use mercado_client::storage::{KeyValueStore, MemoryStore, keys};
use mercado_integration_tests::{FakeBackend, test_context};

fn registration(email: &str, name: &str) -> RegistrationForm {
    RegistrationForm {
        email: email.to_owned(),
        display_name: name.to_owned(),
        password: SecretString::from("correct horse battery"),
    }
}

// ============================================================================
// Register / login / logout
// ============================================================================

#[tokio::test]
async fn test_register_establishes_session() {
    let (ctx, store) = test_context();

    let outcome = ctx
        .register(registration("ana@example.com", "Ana"))
        .await
        .expect("registration should succeed");

    assert_eq!(outcome.session.display_name, "Ana");
    assert!(ctx.session().is_logged_in());
    assert!(ctx.session().auth_token().is_some());
    assert!(store.get(keys::CURRENT_SESSION).is_some());
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    let err = ctx
        .register(registration("ana@example.com", "Ana Again"))
        .await
        .expect_err("duplicate email should be rejected");

    assert!(matches!(
        err,
        ClientError::Auth(AuthError::UserAlreadyExists)
    ));
    assert!(!ctx.session().is_logged_in());
}

#[tokio::test]
async fn test_login_wrong_password_leaves_guest_state() {
    let (ctx, store) = test_context();
    ctx.backend().seed_user("ana@example.com", "right-password", "Ana");

    let err = ctx
        .login("ana@example.com", "wrong-password")
        .await
        .expect_err("wrong password should fail");

    assert!(matches!(
        err,
        ClientError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(!ctx.session().is_logged_in());
    assert!(store.get(keys::AUTH_TOKEN).is_none());
}

#[tokio::test]
async fn test_unknown_email_indistinguishable_from_wrong_password() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "right-password", "Ana");

    let unknown = ctx
        .login("nadie@example.com", "whatever-pw")
        .await
        .expect_err("unknown email should fail");
    let wrong = ctx
        .login("ana@example.com", "wrong-password")
        .await
        .expect_err("wrong password should fail");

    assert_eq!(unknown.user_message(), wrong.user_message());
}

#[tokio::test]
async fn test_logout_clears_session_even_when_backend_is_down() {
    let (ctx, store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    ctx.backend().set_offline(true);
    ctx.logout().await;

    assert!(!ctx.session().is_logged_in());
    assert!(store.get(keys::CURRENT_SESSION).is_none());
    assert!(store.get(keys::AUTH_TOKEN).is_none());
}

// ============================================================================
// Auth-change listeners
// ============================================================================

#[tokio::test]
async fn test_listener_fires_on_login_and_logout() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _handle = ctx.session().subscribe(move |logged_in| {
        sink.lock().expect("event sink lock").push(logged_in);
    });

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    ctx.logout().await;

    assert_eq!(*events.lock().expect("event sink lock"), vec![true, false]);
}

#[tokio::test]
async fn test_unsubscribed_listener_stops_firing() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handle = ctx
        .session()
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    assert_eq!(count.load(Ordering::SeqCst), 1);

    ctx.session().unsubscribe(handle);
    ctx.logout().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_login_fires_no_notification() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _handle = ctx.session().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let _ = ctx.login("ana@example.com", "wrong").await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// Build a standalone session service whose listeners can hold a handle
/// back to it.
fn session_service() -> Arc<SessionService<FakeBackend>> {
    let backend = Arc::new(FakeBackend::new());
    backend.seed_user("ana@example.com", "pw12345678", "Ana");
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    Arc::new(SessionService::new(backend, store))
}

#[tokio::test]
async fn test_listener_can_subscribe_from_its_own_callback() {
    let service = session_service();

    let nested_events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let svc = Arc::clone(&service);
    let sink = Arc::clone(&nested_events);
    let _handle = service.subscribe(move |_| {
        let sink = Arc::clone(&sink);
        svc.subscribe(move |logged_in| {
            sink.lock().expect("event sink lock").push(logged_in);
        });
    });

    service
        .login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    // subscribed mid-notification, so it misses the login event
    assert!(nested_events.lock().expect("event sink lock").is_empty());

    service.logout().await;
    assert_eq!(*nested_events.lock().expect("event sink lock"), vec![false]);
}

#[tokio::test]
async fn test_listener_can_unsubscribe_itself_during_notification() {
    let service = session_service();

    let count = Arc::new(AtomicUsize::new(0));
    let own_handle: Arc<std::sync::Mutex<Option<ListenerHandle>>> =
        Arc::new(std::sync::Mutex::new(None));

    let svc = Arc::clone(&service);
    let counter = Arc::clone(&count);
    let slot = Arc::clone(&own_handle);
    let handle = service.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(own) = slot.lock().expect("handle slot lock").take() {
            svc.unsubscribe(own);
        }
    });
    *own_handle.lock().expect("handle slot lock") = Some(handle);

    service
        .login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // the listener removed itself on the first event
    service.logout().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Local caches and sentinels
// ============================================================================

#[tokio::test]
async fn test_corrupt_users_cache_reads_as_empty() {
    let (ctx, store) = test_context();
    store.set(keys::USERS_CACHE, "{definitely not json");

    assert!(ctx.session().cached_users().is_empty());
}

#[tokio::test]
async fn test_users_cache_records_each_account_once() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("first login should succeed");
    ctx.logout().await;
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("second login should succeed");

    let users = ctx.session().cached_users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].display_name, "Ana");
}

#[tokio::test]
async fn test_pending_email_prefill_consumed_on_login() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    ctx.session().set_pending_email("ana@example.com");
    assert_eq!(
        ctx.session().pending_email().as_deref(),
        Some("ana@example.com")
    );

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    assert!(ctx.session().pending_email().is_none());
}
