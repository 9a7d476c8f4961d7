//! Staff user entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::StaffRole;

/// A staff account able to log into the admin area.
///
/// Accounts are managed by out-of-scope administration flows; the login
/// subsystem only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffUser {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name. Looked up with a case-sensitive exact match.
    pub username: String,
    /// Argon2 password hash (PHC string, algorithm-tagged).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub name: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Whether the account may log in. Checked only after credentials
    /// verify, so the distinct message never leaks account existence to
    /// an unauthenticated caller.
    pub active: bool,
    /// Staff role.
    pub role: StaffRole,
    /// Preferred interface language tag.
    pub language: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated (including password changes).
    pub updated_at: DateTime<Utc>,
}
