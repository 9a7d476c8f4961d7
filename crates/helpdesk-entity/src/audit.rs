//! Append-only audit trail entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recorded audit event. Rows are append-only; nothing updates or
/// deletes them after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    /// Event row identifier.
    pub id: i64,
    /// Identifier of the entity the event concerns.
    pub entity_id: i64,
    /// Kind of entity, e.g. `"ticket"`.
    pub entity_type: String,
    /// Stable key naming what happened, e.g. `"ticket.autoclosed"`.
    pub event_key: String,
    /// Structured event payload.
    pub detail: serde_json::Value,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a new audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEvent {
    pub entity_id: i64,
    pub entity_type: String,
    pub event_key: String,
    pub detail: serde_json::Value,
}

impl CreateAuditEvent {
    /// Event recorded for each ticket the automatic closer shuts.
    pub fn ticket_autoclosed(ticket_id: i64, tracking_id: &str) -> Self {
        Self {
            entity_id: ticket_id,
            entity_type: "ticket".to_owned(),
            event_key: "ticket.autoclosed".to_owned(),
            detail: serde_json::json!({ "tracking_id": tracking_id }),
        }
    }
}
