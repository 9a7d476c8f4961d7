//! Ticket repository implementation (auto-closure surface only).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::ticket::model::SYSTEM_ACTOR;
use helpdesk_entity::ticket::{Ticket, TicketStatus};

/// Repository for the narrow ticket operations the automatic closer needs.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The status tickets enter after a staff reply, if one is flagged.
    pub async fn find_default_staff_reply_status(&self) -> AppResult<Option<TicketStatus>> {
        sqlx::query_as::<_, TicketStatus>(
            "SELECT * FROM ticket_statuses WHERE is_default_staff_reply = TRUE LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find staff reply status", e)
        })
    }

    /// The status auto-closed tickets are moved into, if one is flagged.
    pub async fn find_autoclose_status(&self) -> AppResult<Option<TicketStatus>> {
        sqlx::query_as::<_, TicketStatus>(
            "SELECT * FROM ticket_statuses WHERE is_autoclose_option = TRUE LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find autoclose status", e)
        })
    }

    /// Close every stale ticket in a single statement and return the rows
    /// that were actually moved.
    ///
    /// The status and cutoff conditions sit inside the UPDATE itself, so
    /// each eligible ticket is claimed exactly once even when two runs
    /// race; the RETURNING set is what the caller may audit and notify on.
    pub async fn close_stale(
        &self,
        from_status: i32,
        to_status: i32,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status = $2, closed_at = NOW(), closed_by = $3 \
             WHERE status = $1 AND last_change <= $4 \
             RETURNING *",
        )
        .bind(from_status)
        .bind(to_status)
        .bind(SYSTEM_ACTOR)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to close stale tickets", e)
        })
    }
}
