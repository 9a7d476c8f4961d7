//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Actor ID recorded when the system itself closes a ticket.
pub const SYSTEM_ACTOR: i32 = -1;

/// A support ticket, reduced to the fields the login-triggered
/// auto-closure needs. Full ticket CRUD lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Ticket row identifier.
    pub id: i64,
    /// Public tracking identifier.
    pub tracking_id: String,
    /// Current status (references `ticket_statuses.id`).
    pub status: i32,
    /// Customer email address, used for close notifications.
    pub owner_email: String,
    /// Ticket subject line.
    pub subject: String,
    /// Timestamp of the last change to the ticket.
    pub last_change: DateTime<Utc>,
    /// When the ticket was closed, if it has been.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the ticket; [`SYSTEM_ACTOR`] for automatic closure.
    pub closed_by: Option<i32>,
}
