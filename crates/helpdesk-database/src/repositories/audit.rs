//! Audit trail repository implementation.

use sqlx::PgPool;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::audit::{AuditEvent, CreateAuditEvent};

/// Repository for the append-only audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an event to the trail.
    pub async fn append(&self, event: &CreateAuditEvent) -> AppResult<AuditEvent> {
        sqlx::query_as::<_, AuditEvent>(
            "INSERT INTO audit_events (entity_id, entity_type, event_key, detail) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(event.entity_id)
        .bind(&event.entity_type)
        .bind(&event.event_key)
        .bind(&event.detail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit event", e))
    }
}
