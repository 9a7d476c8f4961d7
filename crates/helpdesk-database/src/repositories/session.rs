//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::session::Session;
use helpdesk_entity::user::StaffUser;

/// Repository for server-side session rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh anonymous session.
    pub async fn create(
        &self,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (token_hash, expires_at) VALUES ($1, $2) RETURNING *",
        )
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    /// Find a session by token hash, if it has not expired.
    pub async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find session by token", e)
        })
    }

    /// Swap the session's token hash, invalidating the old cookie value.
    /// The expiry clock restarts with the new token.
    pub async fn update_token_hash(
        &self,
        session_id: Uuid,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE sessions SET token_hash = $2, expires_at = $3 WHERE id = $1")
                .bind(session_id)
                .bind(new_hash)
                .bind(expires_at)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to rotate session token", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Session {session_id} not found"
            )));
        }
        Ok(())
    }

    /// Store the session's anti-CSRF token.
    pub async fn set_csrf_token(&self, session_id: Uuid, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET csrf_token = $2 WHERE id = $1")
            .bind(session_id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set CSRF token", e)
            })?;
        Ok(())
    }

    /// Store (or clear) the keyed checksum of the pending image challenge.
    pub async fn set_challenge_checksum(
        &self,
        session_id: Uuid,
        checksum: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET challenge_checksum = $2 WHERE id = $1")
            .bind(session_id)
            .bind(checksum)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set challenge checksum", e)
            })?;
        Ok(())
    }

    /// Mark whether the session has passed its human-verification challenge.
    pub async fn set_challenge_verified(&self, session_id: Uuid, verified: bool) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET challenge_verified = $2 WHERE id = $1")
            .bind(session_id)
            .bind(verified)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set challenge state", e)
            })?;
        Ok(())
    }

    /// Attach an authenticated identity snapshot to the session.
    pub async fn set_identity(
        &self,
        session_id: Uuid,
        user: &StaffUser,
        verify_tag: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE sessions SET user_id = $2, username = $3, role = $4, language = $5, \
                                 verify_tag = $6 \
             WHERE id = $1",
        )
        .bind(session_id)
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.role)
        .bind(&user.language)
        .bind(verify_tag)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set session identity", e)
        })?;
        Ok(())
    }

    /// Delete a session by ID.
    pub async fn delete(&self, session_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired before the given cutoff.
    pub async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
