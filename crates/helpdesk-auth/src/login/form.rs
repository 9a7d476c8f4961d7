//! Login form input, field-level errors, and redirect validation.

use serde::{Deserialize, Serialize};

use helpdesk_core::messages::MessageKey;

/// Raw login form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    /// Submitted username.
    pub user: Option<String>,
    /// Submitted password.
    pub pass: Option<String>,
    /// Image challenge answer.
    pub mysecnum: Option<String>,
    /// External challenge response token.
    pub challenge_response: Option<String>,
    /// Remember-me preference (AUTOLOGIN, JUSTUSER, NOTHANKS).
    pub remember_user: Option<String>,
    /// Post-login redirect target.
    #[serde(rename = "goto")]
    pub goto_target: Option<String>,
    /// Anti-CSRF token.
    pub token: Option<String>,
}

/// Which form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    User,
    Pass,
    Challenge,
    Active,
}

/// One field-level login error. Errors accumulate; a submission with a
/// missing username and a wrong challenge reports both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The flagged field.
    pub field: FormField,
    /// Localizable message key.
    pub message: MessageKey,
}

impl FieldError {
    pub fn new(field: FormField, message: MessageKey) -> Self {
        Self { field, message }
    }
}

/// Validate a requested redirect target against the deployment origin.
///
/// Accepts site-relative paths and absolute URLs under `base_url`; anything
/// else (including protocol-relative `//host` forms) falls back to the
/// default landing page. Open-redirect defense.
pub fn sanitize_redirect(target: Option<&str>, base_url: &str, fallback: &str) -> String {
    let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
        return fallback.to_string();
    };

    if target.starts_with("//") || target.contains('\\') {
        return fallback.to_string();
    }

    if target.starts_with('/') {
        return target.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if let Some(rest) = target.strip_prefix(base) {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
            return target.to_string();
        }
    }

    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://desk.example.com";
    const FALLBACK: &str = "/admin/home";

    #[test]
    fn relative_paths_pass_through() {
        assert_eq!(
            sanitize_redirect(Some("/admin/tickets?id=3"), BASE, FALLBACK),
            "/admin/tickets?id=3"
        );
    }

    #[test]
    fn same_origin_absolute_urls_pass_through() {
        assert_eq!(
            sanitize_redirect(Some("https://desk.example.com/admin/home"), BASE, FALLBACK),
            "https://desk.example.com/admin/home"
        );
    }

    #[test]
    fn foreign_hosts_fall_back() {
        assert_eq!(
            sanitize_redirect(Some("https://evil.example.com/"), BASE, FALLBACK),
            FALLBACK
        );
        // Prefix tricks on the host name must not pass.
        assert_eq!(
            sanitize_redirect(Some("https://desk.example.com.evil.com/"), BASE, FALLBACK),
            FALLBACK
        );
    }

    #[test]
    fn protocol_relative_and_empty_fall_back() {
        assert_eq!(
            sanitize_redirect(Some("//evil.example.com"), BASE, FALLBACK),
            FALLBACK
        );
        assert_eq!(sanitize_redirect(Some("   "), BASE, FALLBACK), FALLBACK);
        assert_eq!(sanitize_redirect(None, BASE, FALLBACK), FALLBACK);
    }
}
