//! Server-side session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::StaffRole;

/// A server-side session row.
///
/// The browser holds only the opaque cookie value; the database stores its
/// SHA-256 hash, so a leaked table never yields usable cookies. The raw
/// password hash is never part of session state — only the derived
/// `verify_tag` survives login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Internal row identifier.
    pub id: Uuid,
    /// SHA-256 hash of the opaque cookie value.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Anti-CSRF token, generated lazily once per session.
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
    /// Whether the human-verification challenge has been passed.
    pub challenge_verified: bool,
    /// Keyed checksum of the expected image-challenge answer, stored at
    /// render time.
    #[serde(skip_serializing)]
    pub challenge_checksum: Option<String>,
    /// Authenticated user's ID; `None` until login succeeds.
    pub user_id: Option<Uuid>,
    /// Authenticated user's login name.
    pub username: Option<String>,
    /// Authenticated user's role.
    pub role: Option<StaffRole>,
    /// Authenticated user's preferred language.
    pub language: Option<String>,
    /// Tag derived from the account's current credential state; a mismatch
    /// against the live account invalidates the session.
    #[serde(skip_serializing)]
    pub verify_tag: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether a login has completed in this session.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the session has passed its absolute expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
