//! Request DTOs.

use serde::Deserialize;

/// Query parameters on `/admin/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    /// Requested action: `do_login`, `login`, `logout`, or absent for the
    /// default (auto-login attempt, then render).
    pub a: Option<String>,
    /// Anti-CSRF token for the logout action.
    pub token: Option<String>,
    /// Notice passthrough, e.g. `session_expired`.
    pub notice: Option<String>,
}
