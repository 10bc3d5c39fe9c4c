//! Wire DTOs and conversions for the Mercado REST backend.
//!
//! The deployed API still answers with the legacy Spanish field names in
//! several places (`id_producto`, `cantidad`, `asunto`, ...) while newer
//! endpoints use English. `#[serde(alias)]` absorbs that drift here so the
//! rest of the crate only ever sees the typed domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercado_core::{
    AccountStatus, CurrencyCode, Email, EmailVerificationStatus, Price, ProductId, ReviewId,
    TicketId, TicketStatus, TicketType, UserId,
};

use crate::models::cart::{CartItem, ProductRef};
use crate::models::review::Review;
use crate::models::session::Session;
use crate::models::ticket::Ticket;

use super::NewTicket;

// =============================================================================
// Response bodies
// =============================================================================

/// Error envelope the backend wraps non-2xx responses in.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(alias = "error", alias = "mensaje")]
    pub message: Option<String>,
}

/// Authentication response: token plus the authenticated user.
#[derive(Debug, Deserialize)]
pub struct AuthResponseBody {
    /// Bearer token.
    pub token: String,
    /// The authenticated user.
    #[serde(alias = "usuario")]
    pub user: UserBody,
}

/// A user as the backend describes one.
#[derive(Debug, Deserialize)]
pub struct UserBody {
    #[serde(alias = "id_usuario")]
    pub id: UserId,
    #[serde(alias = "correo")]
    pub email: Email,
    #[serde(alias = "nombre")]
    pub display_name: String,
    #[serde(default, alias = "verificado")]
    pub email_verified: EmailVerificationStatus,
    #[serde(default, alias = "estado")]
    pub account_status: AccountStatus,
    #[serde(default = "Utc::now", alias = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

/// A product as the backend describes one.
#[derive(Debug, Deserialize)]
pub struct ProductBody {
    #[serde(alias = "id_producto")]
    pub id: ProductId,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "precio")]
    pub price: Decimal,
    #[serde(default, alias = "moneda")]
    pub currency: CurrencyCode,
    #[serde(default, alias = "imagen")]
    pub image_url: Option<String>,
}

/// One line of the remote cart.
#[derive(Debug, Deserialize)]
pub struct CartLineBody {
    #[serde(alias = "producto")]
    pub product: ProductBody,
    #[serde(alias = "cantidad")]
    pub quantity: u32,
}

/// The remote cart.
#[derive(Debug, Deserialize)]
pub struct CartBody {
    #[serde(default, alias = "productos", alias = "lines")]
    pub items: Vec<CartLineBody>,
}

/// A ticket as the backend describes one.
#[derive(Debug, Deserialize)]
pub struct TicketBody {
    pub id: TicketId,
    #[serde(alias = "numero_radicado")]
    pub ticket_number: String,
    #[serde(alias = "tipo")]
    pub ticket_type: TicketType,
    #[serde(alias = "asunto")]
    pub subject: String,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "estado")]
    pub status: TicketStatus,
    #[serde(default = "Utc::now", alias = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", alias = "fecha_actualizacion")]
    pub updated_at: DateTime<Utc>,
}

/// A review as the backend describes one.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub id: ReviewId,
    #[serde(alias = "id_producto")]
    pub product_id: ProductId,
    #[serde(alias = "calificacion")]
    pub rating: u8,
    #[serde(default, alias = "comentario")]
    pub comment: String,
    #[serde(alias = "autor")]
    pub author: String,
    #[serde(default = "Utc::now", alias = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Login request body. No `Debug` derive: it would print the password.
#[derive(Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration request body. No `Debug` derive: it would print the password.
#[derive(Serialize)]
pub struct RegisterBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub display_name: &'a str,
}

/// Cart mutation body.
#[derive(Debug, Serialize)]
pub struct CartLineInputBody {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Ticket creation body.
#[derive(Debug, Serialize)]
pub struct TicketCreateBody<'a> {
    pub client_id: TicketId,
    pub ticket_number: &'a str,
    pub ticket_type: TicketType,
    pub subject: &'a str,
    pub description: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> TicketCreateBody<'a> {
    /// Build the wire body from a [`NewTicket`].
    #[must_use]
    pub fn from_new_ticket(ticket: &'a NewTicket) -> Self {
        Self {
            client_id: ticket.client_id,
            ticket_number: &ticket.ticket_number,
            ticket_type: ticket.ticket_type,
            subject: &ticket.subject,
            description: &ticket.description,
            created_at: ticket.created_at,
        }
    }
}

/// Review creation body.
#[derive(Debug, Serialize)]
pub struct ReviewCreateBody<'a> {
    pub rating: u8,
    pub comment: &'a str,
}

// =============================================================================
// Conversions
// =============================================================================

/// Convert a wire user into a domain session.
#[must_use]
pub fn convert_session(user: UserBody) -> Session {
    Session {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
        email_verified: user.email_verified,
        account_status: user.account_status,
        created_at: user.created_at,
    }
}

/// Convert a wire product into a domain product reference.
#[must_use]
pub fn convert_product(product: ProductBody) -> ProductRef {
    ProductRef {
        id: product.id,
        name: product.name,
        price: Price::new(product.price, product.currency),
        image_url: product.image_url,
    }
}

/// Convert a wire cart into domain cart items, in backend order.
#[must_use]
pub fn convert_cart(cart: CartBody) -> Vec<CartItem> {
    cart.items
        .into_iter()
        .map(|line| CartItem {
            product: convert_product(line.product),
            // The backend should never hand out zero-quantity lines, but the
            // quantity >= 1 invariant is ours to hold.
            quantity: line.quantity.max(1),
        })
        .collect()
}

/// Convert a wire ticket into a domain ticket.
#[must_use]
pub fn convert_ticket(ticket: TicketBody) -> Ticket {
    Ticket {
        id: ticket.id,
        ticket_number: ticket.ticket_number,
        ticket_type: ticket.ticket_type,
        subject: ticket.subject,
        description: ticket.description,
        status: ticket.status,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    }
}

/// Convert a wire review into a domain review.
#[must_use]
pub fn convert_review(review: ReviewBody) -> Review {
    Review {
        id: review.id,
        product_id: review.product_id,
        rating: review.rating,
        comment: review.comment,
        author: review.author,
        created_at: review.created_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_product_accepts_legacy_field_names() {
        let json = r#"{
            "id_producto": 12,
            "nombre": "Cafetera",
            "precio": "89.90",
            "moneda": "COP",
            "imagen": "https://cdn.example.com/cafetera.jpg"
        }"#;
        let body: ProductBody = serde_json::from_str(json).unwrap();
        let product = convert_product(body);

        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.name, "Cafetera");
        assert_eq!(product.price.amount, Decimal::new(8990, 2));
        assert_eq!(product.price.currency_code, CurrencyCode::COP);
    }

    #[test]
    fn test_product_accepts_canonical_field_names() {
        let json = r#"{"id": 12, "name": "Cafetera", "price": "89.90"}"#;
        let body: ProductBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.name, "Cafetera");
        assert!(body.image_url.is_none());
    }

    #[test]
    fn test_cart_accepts_legacy_shape() {
        let json = r#"{
            "productos": [
                {"producto": {"id_producto": 1, "nombre": "P1", "precio": "10.00"}, "cantidad": 2}
            ]
        }"#;
        let body: CartBody = serde_json::from_str(json).unwrap();
        let items = convert_cart(body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_cart_zero_quantity_line_clamped() {
        let json = r#"{"items": [{"product": {"id": 1, "name": "P1", "price": "10.00"}, "quantity": 0}]}"#;
        let body: CartBody = serde_json::from_str(json).unwrap();
        let items = convert_cart(body);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_error_body_aliases() {
        let a: ErrorBody = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
        let b: ErrorBody = serde_json::from_str(r#"{"mensaje": "nope"}"#).unwrap();
        let c: ErrorBody = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert_eq!(a.message.as_deref(), Some("nope"));
        assert_eq!(b.message.as_deref(), Some("nope"));
        assert_eq!(c.message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_user_defaults() {
        let json = r#"{"id_usuario": 3, "correo": "ana@example.com", "nombre": "Ana"}"#;
        let body: UserBody = serde_json::from_str(json).unwrap();
        let session = convert_session(body);
        assert_eq!(session.user_id, UserId::new(3));
        assert_eq!(session.email_verified, EmailVerificationStatus::Unverified);
        assert_eq!(session.account_status, AccountStatus::Active);
    }

    #[test]
    fn test_ticket_legacy_shape() {
        let json = format!(
            r#"{{
                "id": "{}",
                "numero_radicado": "PQRS-2026-0001234567",
                "tipo": "complaint",
                "asunto": "Pedido tardio",
                "descripcion": "Llego dos semanas tarde",
                "estado": "in_progress"
            }}"#,
            uuid::Uuid::new_v4()
        );
        let body: TicketBody = serde_json::from_str(&json).unwrap();
        let ticket = convert_ticket(body);
        assert_eq!(ticket.ticket_type, TicketType::Complaint);
        assert_eq!(ticket.status, TicketStatus::InProgress);
    }
}
