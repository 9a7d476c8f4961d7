//! Ticket status entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Who may move a ticket out of a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "status_closable", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Closable {
    /// Anyone may close tickets in this status.
    Yes,
    /// Only staff (and the system) may close.
    #[sqlx(rename = "sonly")]
    #[serde(rename = "sonly")]
    StaffOnly,
    /// Only the customer may close.
    #[sqlx(rename = "conly")]
    #[serde(rename = "conly")]
    CustomerOnly,
    /// The status is not closable.
    No,
}

impl Closable {
    /// Whether the automatic closer is allowed to transition out of a
    /// status with this policy.
    pub fn by_system(&self) -> bool {
        matches!(self, Self::Yes | Self::StaffOnly)
    }
}

/// A configurable ticket status row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketStatus {
    /// Status row identifier.
    pub id: i32,
    /// Close policy for tickets in this status.
    pub closable: Closable,
    /// Whether this is the status tickets enter after a staff reply
    /// (the "awaiting customer" status the auto-closer scans).
    pub is_default_staff_reply: bool,
    /// Whether this is the status auto-closed tickets are moved into.
    pub is_autoclose_option: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_close_policy() {
        assert!(Closable::Yes.by_system());
        assert!(Closable::StaffOnly.by_system());
        assert!(!Closable::CustomerOnly.by_system());
        assert!(!Closable::No.by_system());
    }
}
