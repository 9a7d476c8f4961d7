//! Login and brute-force throttling configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Consecutive failed attempts from one address before it is banned.
    /// `0` disables the limiter entirely.
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: u32,
    /// Rolling ban window in minutes. A banned address is rejected until
    /// this long after its last attempt.
    #[serde(default = "default_ban_minutes")]
    pub attempt_ban_minutes: i64,
    /// Whether the full auto-login ("remember me" with derived token)
    /// option is offered; username-only remembering is always available.
    #[serde(default = "default_true")]
    pub autologin: bool,
    /// Lifetime of the remember-me cookies in days.
    #[serde(default = "default_remember_days")]
    pub remember_ttl_days: i64,
    /// Default install password; a successful login with it surfaces a
    /// change-your-password notice.
    #[serde(default = "default_install_password")]
    pub default_install_password: String,
}

fn default_attempt_limit() -> u32 {
    5
}

fn default_ban_minutes() -> i64 {
    15
}

fn default_true() -> bool {
    true
}

fn default_remember_days() -> i64 {
    365
}

fn default_install_password() -> String {
    "admin".to_string()
}
