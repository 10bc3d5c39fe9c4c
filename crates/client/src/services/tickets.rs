//! PQRS ticket service.
//!
//! Tickets (peticiones, quejas, reclamos, sugerencias) are created against
//! the backend when a session exists and against the local store otherwise.
//! A remote creation failure falls back to the local store, so a ticket is
//! never lost; locally held tickets can later be pushed to the backend with
//! [`TicketService::migrate_local`], which is explicit rather than part of
//! the login flow because it rewrites ticket identity.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, BackendError, NewTicket};
use crate::models::ticket::{Ticket, TicketDraft};
use crate::services::session::SessionService;
use crate::storage::{KeyValueStore, keys, read_json, write_json};

/// One local ticket the backend did not accept.
#[derive(Debug)]
pub struct TicketMigrationFailure {
    pub ticket: Ticket,
    pub error: BackendError,
}

/// Outcome of pushing locally held tickets to the backend.
///
/// `migrated` holds the canonical tickets as the backend returned them;
/// their ids and ticket numbers may differ from the local originals.
#[derive(Debug, Default)]
pub struct TicketMigrationReport {
    pub migrated: Vec<Ticket>,
    pub failures: Vec<TicketMigrationFailure>,
}

impl TicketMigrationReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.migrated.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dual-mode PQRS tickets.
pub struct TicketService<B> {
    backend: Arc<B>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionService<B>>,
}

impl<B: Backend> TicketService<B> {
    pub fn new(
        backend: Arc<B>,
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionService<B>>,
    ) -> Self {
        Self {
            backend,
            store,
            session,
        }
    }

    /// File a new ticket.
    ///
    /// Authenticated: created against the backend, returning the canonical
    /// ticket; on failure the locally built ticket is stored and returned
    /// instead. Guest: stored locally.
    #[instrument(skip(self, draft), fields(ticket_type = %draft.ticket_type))]
    pub async fn create(&self, draft: TicketDraft) -> Ticket {
        let ticket = draft.into_local_ticket(Utc::now());

        if !self.remote_eligible() {
            debug!(ticket_number = %ticket.ticket_number, "storing ticket locally (guest)");
            self.store_local(ticket.clone());
            return ticket;
        }

        match self.backend.create_ticket(NewTicket::from(&ticket)).await {
            Ok(canonical) => canonical,
            Err(err) => {
                warn!(
                    ticket_number = %ticket.ticket_number,
                    error = %err,
                    "remote ticket creation failed, keeping local copy"
                );
                self.store_local(ticket.clone());
                ticket
            }
        }
    }

    /// List the user's tickets.
    ///
    /// Authenticated: the backend's list, falling back to the local list
    /// when the fetch fails. Guest: the local list.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Ticket> {
        if self.remote_eligible() {
            match self.backend.fetch_tickets().await {
                Ok(tickets) => return tickets,
                Err(err) => {
                    warn!(error = %err, "ticket fetch failed, falling back to local tickets");
                }
            }
        }
        self.local_tickets()
    }

    /// Tickets held only in the local store.
    #[must_use]
    pub fn local_tickets(&self) -> Vec<Ticket> {
        read_json(self.store.as_ref(), keys::TICKETS).unwrap_or_default()
    }

    /// Push locally held tickets to the backend.
    ///
    /// Each successfully migrated ticket is replaced by the backend's
    /// canonical version. Tickets that fail stay in the local store; only
    /// they remain after a partial migration.
    #[instrument(skip(self))]
    pub async fn migrate_local(&self) -> TicketMigrationReport {
        let mut report = TicketMigrationReport::default();

        if !self.remote_eligible() {
            debug!("ticket migration requested without a session, nothing to do");
            return report;
        }

        let local = self.local_tickets();
        if local.is_empty() {
            return report;
        }

        let mut remaining = Vec::new();
        for ticket in local {
            match self.backend.create_ticket(NewTicket::from(&ticket)).await {
                Ok(canonical) => report.migrated.push(canonical),
                Err(err) => {
                    warn!(
                        ticket_number = %ticket.ticket_number,
                        error = %err,
                        "ticket failed to migrate"
                    );
                    report.failures.push(TicketMigrationFailure {
                        ticket: ticket.clone(),
                        error: err,
                    });
                    remaining.push(ticket);
                }
            }
        }

        if remaining.is_empty() {
            self.store.remove(keys::TICKETS);
        } else {
            write_json(self.store.as_ref(), keys::TICKETS, &remaining);
        }

        debug!(
            migrated = report.migrated.len(),
            failed = report.failures.len(),
            "local ticket migration finished"
        );
        report
    }

    fn remote_eligible(&self) -> bool {
        self.session.is_logged_in() && self.session.auth_token().is_some()
    }

    fn store_local(&self, ticket: Ticket) {
        let mut tickets = self.local_tickets();
        tickets.push(ticket);
        write_json(self.store.as_ref(), keys::TICKETS, &tickets);
    }
}
