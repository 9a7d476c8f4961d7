//! Remember-me cookie token derivation and policy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::token;

/// What the user asked the login form to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RememberPreference {
    /// Keep both the username and the derived auto-login token.
    AutoLogin,
    /// Keep the username only.
    UsernameOnly,
    /// Remember nothing.
    #[default]
    Nothing,
}

impl RememberPreference {
    /// Parse the form value. Unknown values fall back to remembering
    /// nothing.
    pub fn from_form_value(value: Option<&str>) -> Self {
        match value {
            Some("AUTOLOGIN") => Self::AutoLogin,
            Some("JUSTUSER") => Self::UsernameOnly,
            _ => Self::Nothing,
        }
    }
}

/// Cookie changes a finished login asks the HTTP layer to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RememberAction {
    /// Set the username cookie and the derived auto-login token cookie.
    SetAutoLogin { username: String, derived: String },
    /// Set the username cookie, clear the token cookie.
    SetUsernameOnly { username: String },
    /// Clear both cookies.
    Clear,
}

/// Derive the auto-login cookie token from the stored credential hash.
///
/// The input ordering is hash, lowercased username, hash again; the cookie
/// value is worthless without knowing the stored hash it was derived from.
pub fn derive_remember_token(password_hash: &str, username: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password_hash.as_bytes());
    hasher.update(username.to_lowercase().as_bytes());
    hasher.update(password_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether a presented auto-login cookie matches the account's current
/// credential state. Constant-time.
pub fn remember_token_matches(presented: &str, password_hash: &str, username: &str) -> bool {
    token::constant_time_eq(presented, &derive_remember_token(password_hash, username))
}

/// Resolve the cookie action for a finished login.
///
/// Auto-login can be disabled server-wide; the preference then degrades to
/// remembering the username only.
pub fn resolve_action(
    preference: RememberPreference,
    autologin_enabled: bool,
    username: &str,
    password_hash: &str,
) -> RememberAction {
    match preference {
        RememberPreference::AutoLogin if autologin_enabled => RememberAction::SetAutoLogin {
            username: username.to_string(),
            derived: derive_remember_token(password_hash, username),
        },
        RememberPreference::AutoLogin | RememberPreference::UsernameOnly => {
            RememberAction::SetUsernameOnly {
                username: username.to_string(),
            }
        }
        RememberPreference::Nothing => RememberAction::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_reproducible_and_case_folds_username() {
        let a = derive_remember_token("$argon2id$h", "Alice");
        let b = derive_remember_token("$argon2id$h", "alice");
        assert_eq!(a, b);
        assert!(remember_token_matches(&a, "$argon2id$h", "ALICE"));
        assert!(!remember_token_matches(&a, "$argon2id$other", "alice"));
    }

    #[test]
    fn form_values_parse() {
        assert_eq!(
            RememberPreference::from_form_value(Some("AUTOLOGIN")),
            RememberPreference::AutoLogin
        );
        assert_eq!(
            RememberPreference::from_form_value(Some("JUSTUSER")),
            RememberPreference::UsernameOnly
        );
        assert_eq!(
            RememberPreference::from_form_value(Some("NOTHANKS")),
            RememberPreference::Nothing
        );
        assert_eq!(
            RememberPreference::from_form_value(None),
            RememberPreference::Nothing
        );
    }

    #[test]
    fn disabled_autologin_degrades_to_username_only() {
        let action = resolve_action(RememberPreference::AutoLogin, false, "alice", "$h");
        assert_eq!(
            action,
            RememberAction::SetUsernameOnly {
                username: "alice".to_string()
            }
        );
    }
}
