//! `AuthStaff` extractor — resolves the session cookie to a staff account.
//!
//! Every authenticated page load re-checks the session's verify tag against
//! the account's current credential state; a password change elsewhere
//! kills the session here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use helpdesk_core::error::AppError;
use helpdesk_entity::session::Session;
use helpdesk_entity::user::StaffUser;

use crate::cookies;
use crate::state::AppState;

/// Extracted authenticated staff context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthStaff {
    /// The resolved session row.
    pub session: Session,
    /// The authenticated account.
    pub user: StaffUser,
}

impl FromRequestParts<AppState> for AuthStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_name = state.session_manager.cookie_name();
        let raw_token = cookies::extract_cookie(&parts.headers, cookie_name)
            .ok_or_else(|| AppError::unauthorized("Not logged in"))?;

        let token_hash = helpdesk_auth::token::hash_token(&raw_token);
        let session = state
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session expired"))?;

        let Some(user_id) = session.user_id else {
            return Err(AppError::unauthorized("Not logged in"));
        };

        let Some(user) = state.user_repo.find_by_id(user_id).await? else {
            let _ = state.session_manager.destroy(session.id).await;
            return Err(AppError::unauthorized("Session expired"));
        };

        if !state.session_manager.identity_still_valid(&session, &user) {
            // Credentials changed since login.
            state.session_manager.destroy(session.id).await?;
            return Err(AppError::unauthorized("Session expired"));
        }

        if !user.active {
            state.session_manager.destroy(session.id).await?;
            return Err(AppError::unauthorized("Account deactivated"));
        }

        Ok(Self { session, user })
    }
}
