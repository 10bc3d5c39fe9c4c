//! Status and category enums for domain entities.

use serde::{Deserialize, Serialize};

/// Account status for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Deleted,
}

/// Email verification status for users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailVerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
}

/// PQRS ticket category.
///
/// PQRS is the customer-service taxonomy used by Colombian retailers:
/// Peticion / Queja / Reclamo / Sugerencia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Petition,
    Complaint,
    Claim,
    Suggestion,
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Petition => write!(f, "petition"),
            Self::Complaint => write!(f, "complaint"),
            Self::Claim => write!(f, "claim"),
            Self::Suggestion => write!(f, "suggestion"),
        }
    }
}

impl std::str::FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petition" => Ok(Self::Petition),
            "complaint" => Ok(Self::Complaint),
            "claim" => Ok(Self::Claim),
            "suggestion" => Ok(Self::Suggestion),
            _ => Err(format!("invalid ticket type: {s}")),
        }
    }
}

/// PQRS ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Whether the ticket can still be updated by the customer.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_type_roundtrip() {
        for ty in [
            TicketType::Petition,
            TicketType::Complaint,
            TicketType::Claim,
            TicketType::Suggestion,
        ] {
            let parsed: TicketType = ty.to_string().parse().unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn test_ticket_type_invalid() {
        assert!("question".parse::<TicketType>().is_err());
    }

    #[test]
    fn test_ticket_status_is_open() {
        assert!(TicketStatus::Open.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Resolved.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let json = serde_json::to_string(&AccountStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
