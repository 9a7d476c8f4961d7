//! Login attempt counter repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::attempt::LoginAttempt;

/// Repository for per-address failed-login counters.
#[derive(Debug, Clone)]
pub struct AttemptRepository {
    pool: PgPool,
}

impl AttemptRepository {
    /// Create a new attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the counter row for an address.
    pub async fn find(&self, ip: &str) -> AppResult<Option<LoginAttempt>> {
        sqlx::query_as::<_, LoginAttempt>("SELECT * FROM login_attempts WHERE ip = $1")
            .bind(ip)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find login attempts", e)
            })
    }

    /// Write the counter for an address, creating the row if needed.
    ///
    /// Last write wins; the caller computes the new count from its own
    /// read. Losing an increment under concurrent failures is acceptable.
    pub async fn upsert(
        &self,
        ip: &str,
        failures: i32,
        last_attempt: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO login_attempts (ip, failures, last_attempt) VALUES ($1, $2, $3) \
             ON CONFLICT (ip) DO UPDATE SET failures = $2, last_attempt = $3",
        )
        .bind(ip)
        .bind(failures)
        .bind(last_attempt)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record login attempt", e)
        })?;
        Ok(())
    }

    /// Remove the counter row for an address.
    pub async fn delete(&self, ip: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE ip = $1")
            .bind(ip)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear login attempts", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete counters whose last attempt predates the cutoff.
    pub async fn cleanup_stale(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE last_attempt < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup login attempts", e)
            })?;
        Ok(result.rows_affected())
    }
}
