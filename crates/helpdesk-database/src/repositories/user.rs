//! Staff user repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::user::StaffUser;

/// Repository for staff account lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a staff user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StaffUser>> {
        sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a staff user by exact username. Lookups are case-sensitive;
    /// `Admin` and `admin` are distinct accounts.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<StaffUser>> {
        sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }
}
