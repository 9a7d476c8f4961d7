//! Permanent deny-list repository implementation.

use sqlx::PgPool;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;

/// Repository for the permanent address deny-list.
#[derive(Debug, Clone)]
pub struct BannedIpRepository {
    pool: PgPool,
}

impl BannedIpRepository {
    /// Create a new deny-list repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether the numeric address falls inside any banned range.
    pub async fn is_banned(&self, ip_long: i64) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM banned_ips WHERE $1 BETWEEN ip_from AND ip_to)",
        )
        .bind(ip_long)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check deny-list", e))
    }
}
