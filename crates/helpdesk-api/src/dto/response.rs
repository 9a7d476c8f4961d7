//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use helpdesk_entity::user::{StaffRole, StaffUser};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// One flagged form field with its localized message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldErrorBody {
    /// Flagged field name (`user`, `pass`, `challenge`, `active`).
    pub field: String,
    /// Localized message text.
    pub message: String,
}

/// Render state of the login form. Template rendering happens elsewhere;
/// this is everything a renderer needs. Deliberately absent: the expected
/// challenge answer, which is only ever served as a rendered image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPageState {
    /// Flagged fields from the previous submission, if any.
    pub errors: Vec<FieldErrorBody>,
    /// Non-blocking notice text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Username remembered from a previous login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remembered_username: Option<String>,
    /// Whether the form must include a challenge answer.
    pub challenge_required: bool,
    /// Anti-CSRF token to echo back on submission.
    pub csrf_token: String,
}

/// Staff account summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffSummary {
    /// Account ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role.
    pub role: StaffRole,
    /// Preferred language.
    pub language: String,
}

impl From<&StaffUser> for StaffSummary {
    fn from(user: &StaffUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            language: user.language.clone(),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSuccessBody {
    /// Where the client should navigate next.
    pub redirect: String,
    /// The authenticated account.
    pub user: StaffSummary,
    /// Non-blocking advisory, e.g. default-password warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database connectivity.
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_state_never_carries_the_expected_answer() {
        let page = LoginPageState {
            errors: Vec::new(),
            notice: None,
            remembered_username: None,
            challenge_required: true,
            csrf_token: "token".to_string(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("challenge_code").is_none());
        assert!(json.get("challenge_checksum").is_none());
        assert!(json["challenge_required"].as_bool().unwrap());
    }
}
