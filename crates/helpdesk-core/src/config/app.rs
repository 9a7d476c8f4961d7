//! Server and redirect configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL of the helpdesk, used for same-origin redirect checks.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path redirected to after a successful login without a `goto` target.
    #[serde(default = "default_landing_path")]
    pub default_landing_path: String,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_landing_path() -> String {
    "/admin/home".to_string()
}

fn default_shutdown_grace() -> u64 {
    30
}
