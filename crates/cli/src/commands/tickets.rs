//! PQRS ticket commands.

use mercado_client::context::StoreContext;
use mercado_client::error::{ClientError, Result};
use mercado_client::models::ticket::TicketDraft;
use mercado_client::{HttpBackend, Ticket};
use mercado_core::TicketType;

pub async fn create(
    ctx: &StoreContext<HttpBackend>,
    ticket_type: &str,
    subject: String,
    description: String,
) -> Result<()> {
    let ticket_type: TicketType = ticket_type.parse().map_err(|_| {
        ClientError::Validation(format!(
            "unknown ticket type '{ticket_type}' (expected petition, complaint, claim, or suggestion)"
        ))
    })?;

    if subject.trim().is_empty() {
        return Err(ClientError::Validation(
            "Please provide a subject for the ticket.".to_owned(),
        ));
    }

    let ticket = ctx
        .tickets()
        .create(TicketDraft {
            ticket_type,
            subject,
            description,
        })
        .await;

    println!("Ticket filed: {}", ticket.ticket_number);
    Ok(())
}

pub async fn list(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    let tickets = ctx.tickets().list().await;
    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }

    for ticket in &tickets {
        print_ticket(ticket);
    }
    Ok(())
}

pub async fn migrate(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    if !ctx.session().is_logged_in() {
        return Err(ClientError::NotAuthenticated);
    }

    let report = ctx.tickets().migrate_local().await;
    if report.attempted() == 0 {
        println!("No local tickets to migrate.");
        return Ok(());
    }

    println!(
        "Migrated {} of {} ticket(s).",
        report.migrated.len(),
        report.attempted()
    );
    for migrated in &report.migrated {
        println!("  {} (new number)", migrated.ticket_number);
    }
    for failure in &report.failures {
        println!("  {} failed, kept locally", failure.ticket.ticket_number);
    }
    Ok(())
}

fn print_ticket(ticket: &Ticket) {
    println!(
        "{} [{}] {} - {}",
        ticket.ticket_number,
        ticket.status,
        ticket.ticket_type,
        ticket.subject
    );
}
