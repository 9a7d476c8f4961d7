//! Per-address login attempt counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Failed-login counter for one source address.
///
/// Created lazily on the first attempt from an address, deleted outright
/// on a successful login. Updates are last-write-wins; the limiter
/// tolerates losing a handful of increments under concurrent logins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// Source network address (textual form, primary key).
    pub ip: String,
    /// Count of consecutive failures.
    pub failures: i32,
    /// Timestamp of the most recent attempt.
    pub last_attempt: DateTime<Utc>,
}
