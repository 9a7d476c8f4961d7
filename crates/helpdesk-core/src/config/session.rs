//! Session cookie configuration.

use serde::{Deserialize, Serialize};

/// Session cookie and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether to set the `Secure` attribute on cookies. Enable whenever
    /// the helpdesk is served over HTTPS.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Absolute session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

impl SessionConfig {
    /// Session lifetime expressed in seconds, for cookie `Max-Age`.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_hours * 3600
    }
}

fn default_cookie_name() -> String {
    "hd_session".to_string()
}

fn default_ttl_hours() -> i64 {
    12
}
