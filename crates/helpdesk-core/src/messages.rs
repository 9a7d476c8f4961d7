//! Localized user-visible messages.
//!
//! Every string shown to an end user is looked up here by key, never built
//! ad hoc in handlers. The catalog is carried in the request-scoped context
//! so components never reach for ambient state.

use std::collections::HashMap;

/// Keys for every user-visible message in the login subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    /// Username field was left empty.
    EnterUsername,
    /// Password field was left empty.
    EnterPassword,
    /// Challenge answer missing.
    ChallengeMissing,
    /// Challenge answer wrong.
    ChallengeWrong,
    /// Unknown username or wrong password (single shared message).
    WrongCredentials,
    /// Account exists and credentials verified, but it is deactivated.
    InactiveAccount,
    /// Too many failed attempts from this address.
    TooManyAttempts,
    /// Address is permanently banned.
    BannedAddress,
    /// Anti-CSRF token missing or mismatched.
    InvalidToken,
    /// Logout completed.
    LogoutSuccess,
    /// Session expired, please log in again.
    SessionExpired,
    /// The account still uses the default install password.
    DefaultPasswordNotice,
}

/// Message catalog keyed by language tag.
///
/// Ships with a built-in English table; additional languages can be
/// registered at startup. Lookups fall back to English for unknown
/// languages or missing keys.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    tables: HashMap<String, HashMap<MessageKey, String>>,
}

impl MessageCatalog {
    /// Build the catalog with the built-in English table.
    pub fn builtin() -> Self {
        let mut en = HashMap::new();
        en.insert(MessageKey::EnterUsername, "Please enter your username".to_string());
        en.insert(MessageKey::EnterPassword, "Please enter your password".to_string());
        en.insert(
            MessageKey::ChallengeMissing,
            "Please enter the verification answer".to_string(),
        );
        en.insert(
            MessageKey::ChallengeWrong,
            "The verification answer was not correct".to_string(),
        );
        en.insert(
            MessageKey::WrongCredentials,
            "Wrong username or password".to_string(),
        );
        en.insert(
            MessageKey::InactiveAccount,
            "This account has been deactivated".to_string(),
        );
        en.insert(
            MessageKey::TooManyAttempts,
            "Too many failed login attempts; please wait before trying again".to_string(),
        );
        en.insert(
            MessageKey::BannedAddress,
            "Access from your network address is not permitted".to_string(),
        );
        en.insert(
            MessageKey::InvalidToken,
            "Security token mismatch; please try again".to_string(),
        );
        en.insert(MessageKey::LogoutSuccess, "You have been logged out".to_string());
        en.insert(
            MessageKey::SessionExpired,
            "Your session has expired, please log in again".to_string(),
        );
        en.insert(
            MessageKey::DefaultPasswordNotice,
            "You are still using the default password; please change it".to_string(),
        );

        let mut tables = HashMap::new();
        tables.insert("en".to_string(), en);
        Self { tables }
    }

    /// Register or replace a message table for a language.
    pub fn register(&mut self, language: &str, table: HashMap<MessageKey, String>) {
        self.tables.insert(language.to_string(), table);
    }

    /// Look up a message, falling back to English.
    pub fn get(&self, language: &str, key: MessageKey) -> &str {
        self.tables
            .get(language)
            .and_then(|t| t.get(&key))
            .or_else(|| self.tables.get("en").and_then(|t| t.get(&key)))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_for_unknown_language() {
        let catalog = MessageCatalog::builtin();
        assert_eq!(
            catalog.get("de", MessageKey::WrongCredentials),
            catalog.get("en", MessageKey::WrongCredentials),
        );
    }

    #[test]
    fn registered_language_overrides() {
        let mut catalog = MessageCatalog::builtin();
        let mut sl = HashMap::new();
        sl.insert(
            MessageKey::WrongCredentials,
            "Napacno uporabnisko ime ali geslo".to_string(),
        );
        catalog.register("sl", sl);
        assert_eq!(
            catalog.get("sl", MessageKey::WrongCredentials),
            "Napacno uporabnisko ime ali geslo"
        );
        // Missing keys in the new table still fall back.
        assert_eq!(
            catalog.get("sl", MessageKey::EnterUsername),
            "Please enter your username"
        );
    }
}
