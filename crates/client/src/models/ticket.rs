//! PQRS ticket model.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use mercado_core::{TicketId, TicketStatus, TicketType};

/// A customer-service request (Peticion/Queja/Reclamo/Sugerencia).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier (client-generated for guest tickets).
    pub id: TicketId,
    /// Human-readable ticket number, e.g. `PQRS-2026-0482913570`.
    ///
    /// Generated client-side for guest tickets and therefore provisional;
    /// the backend assigns the canonical number on migration.
    pub ticket_number: String,
    /// PQRS category.
    pub ticket_type: TicketType,
    /// Short subject line.
    pub subject: String,
    /// Full description.
    pub description: String,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// PQRS category.
    pub ticket_type: TicketType,
    /// Short subject line.
    pub subject: String,
    /// Full description.
    pub description: String,
}

impl TicketDraft {
    /// Materialize the draft as a local (guest-mode) ticket.
    #[must_use]
    pub fn into_local_ticket(self, now: DateTime<Utc>) -> Ticket {
        Ticket {
            id: TicketId::generate(),
            ticket_number: generate_ticket_number(now),
            ticket_type: self.ticket_type,
            subject: self.subject,
            description: self.description,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generate a display ticket number: `PQRS-<year>-<10 digits>`.
///
/// The digits mix the millisecond timestamp with a random suffix so two
/// tickets created in the same instant still differ. Uniqueness is
/// best-effort only; these numbers are provisional until the backend assigns
/// its own.
#[must_use]
pub fn generate_ticket_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().unsigned_abs() % 10_000_000;
    let suffix: u64 = rand::rng().random_range(0..1_000);
    format!("PQRS-{}-{:010}", now.year(), millis * 1_000 + suffix)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_number_format() {
        let now = Utc::now();
        let number = generate_ticket_number(now);

        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("PQRS"));
        assert_eq!(parts.next(), Some(now.year().to_string().as_str()));

        let digits = parts.next().unwrap();
        assert_eq!(digits.len(), 10);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert!(parts.next().is_none());
    }

    #[test]
    fn test_into_local_ticket_starts_open() {
        let draft = TicketDraft {
            ticket_type: TicketType::Complaint,
            subject: "Late delivery".to_owned(),
            description: "Order arrived two weeks late".to_owned(),
        };
        let now = Utc::now();
        let ticket = draft.clone().into_local_ticket(now);

        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.subject, draft.subject);
        assert_eq!(ticket.created_at, now);
        assert_eq!(ticket.updated_at, now);
    }

    #[test]
    fn test_local_tickets_get_distinct_ids() {
        let draft = TicketDraft {
            ticket_type: TicketType::Suggestion,
            subject: "s".to_owned(),
            description: "d".to_owned(),
        };
        let now = Utc::now();
        let a = draft.clone().into_local_ticket(now);
        let b = draft.into_local_ticket(now);
        assert_ne!(a.id, b.id);
    }
}
