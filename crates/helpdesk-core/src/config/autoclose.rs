//! Stale-ticket auto-closure configuration.

use serde::{Deserialize, Serialize};

/// Settings for closing tickets left awaiting a customer response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoCloseConfig {
    /// Tickets untouched for this many days are closed on staff login.
    /// `0` disables the feature.
    #[serde(default = "default_days")]
    pub days: i64,
    /// Whether customers are notified when their ticket is auto-closed.
    #[serde(default)]
    pub notify_customers: bool,
}

impl AutoCloseConfig {
    /// Whether auto-closure is enabled at all.
    pub fn enabled(&self) -> bool {
        self.days > 0
    }
}

fn default_days() -> i64 {
    0
}
