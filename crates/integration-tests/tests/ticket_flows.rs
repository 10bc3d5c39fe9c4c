//! PQRS ticket flows: local filing, remote filing with fallback, and the
//! explicit migration of locally held tickets.

use mercado_integration_tests::{TicketDraft, TicketType, test_context};

fn draft(subject: &str) -> TicketDraft {
    TicketDraft {
        ticket_type: TicketType::Complaint,
        subject: subject.to_owned(),
        description: "The order arrived a week late.".to_owned(),
    }
}

// ============================================================================
// Filing
// ============================================================================

#[tokio::test]
async fn test_guest_ticket_is_stored_locally() {
    let (ctx, _store) = test_context();

    let ticket = ctx.tickets().create(draft("Late delivery")).await;

    assert!(ticket.ticket_number.starts_with("PQRS-"));
    assert_eq!(ctx.tickets().local_tickets().len(), 1);
    assert_eq!(ctx.tickets().list().await.len(), 1);
}

#[tokio::test]
async fn test_authenticated_ticket_gets_backend_identity() {
    let (ctx, _store) = test_context();
    let user_id = ctx
        .backend()
        .seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    let ticket = ctx.tickets().create(draft("Late delivery")).await;

    assert!(ticket.ticket_number.starts_with("PQRS-SRV-"));
    assert!(ctx.tickets().local_tickets().is_empty());
    assert_eq!(ctx.backend().remote_tickets(user_id).len(), 1);
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local_ticket() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    ctx.backend().set_fail_ticket_create(true);
    let ticket = ctx.tickets().create(draft("Late delivery")).await;

    // The ticket is never lost: it lands in the local store with its
    // provisional number.
    assert!(!ticket.ticket_number.starts_with("PQRS-SRV-"));
    assert_eq!(ctx.tickets().local_tickets().len(), 1);
}

#[tokio::test]
async fn test_list_falls_back_to_local_when_fetch_fails() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    let local = ctx.tickets().create(draft("Filed as guest")).await;

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    ctx.backend().set_offline(true);

    let listed = ctx.tickets().list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].ticket_number, local.ticket_number);
}

// ============================================================================
// Migration
// ============================================================================

#[tokio::test]
async fn test_migration_replaces_local_identity_with_canonical() {
    let (ctx, _store) = test_context();
    let user_id = ctx
        .backend()
        .seed_user("ana@example.com", "pw12345678", "Ana");

    let local = ctx.tickets().create(draft("Filed as guest")).await;
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    let report = ctx.tickets().migrate_local().await;

    assert!(report.is_complete());
    assert_eq!(report.migrated.len(), 1);
    assert_ne!(report.migrated[0].id, local.id);
    assert_ne!(report.migrated[0].ticket_number, local.ticket_number);

    assert!(ctx.tickets().local_tickets().is_empty());
    assert_eq!(ctx.backend().remote_tickets(user_id).len(), 1);
}

#[tokio::test]
async fn test_partial_migration_keeps_failed_tickets_local() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");

    ctx.tickets().create(draft("Accepted one")).await;
    ctx.tickets().create(draft("Rejected one")).await;
    ctx.backend().reject_ticket_subject("Rejected one");

    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");
    let report = ctx.tickets().migrate_local().await;

    assert!(!report.is_complete());
    assert_eq!(report.attempted(), 2);
    assert_eq!(report.migrated.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].ticket.subject, "Rejected one");

    // Only the rejected ticket survives locally, so a retry cannot
    // duplicate the accepted one.
    let remaining = ctx.tickets().local_tickets();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].subject, "Rejected one");
}

#[tokio::test]
async fn test_migration_without_session_does_nothing() {
    let (ctx, _store) = test_context();
    ctx.tickets().create(draft("Filed as guest")).await;

    let report = ctx.tickets().migrate_local().await;

    assert_eq!(report.attempted(), 0);
    assert_eq!(ctx.tickets().local_tickets().len(), 1);
}

#[tokio::test]
async fn test_migration_with_no_local_tickets_is_empty_report() {
    let (ctx, _store) = test_context();
    ctx.backend().seed_user("ana@example.com", "pw12345678", "Ana");
    ctx.login("ana@example.com", "pw12345678")
        .await
        .expect("login should succeed");

    let report = ctx.tickets().migrate_local().await;
    assert_eq!(report.attempted(), 0);
}
