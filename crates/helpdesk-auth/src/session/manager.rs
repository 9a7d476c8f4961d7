//! Session lifecycle manager.
//!
//! The browser only ever holds an opaque token; the session row is keyed by
//! the token's SHA-256 hash. Session identifiers are never accepted from
//! query strings or request bodies.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use helpdesk_core::config::SessionConfig;
use helpdesk_core::result::AppResult;
use helpdesk_entity::session::Session;
use helpdesk_entity::user::StaffUser;

use crate::store::SessionStore;
use crate::token;

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// Session persistence.
    sessions: Arc<dyn SessionStore>,
    /// Session configuration.
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(sessions: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { sessions, config }
    }

    fn expiry_from_now(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::seconds(self.config.ttl_seconds())
    }

    /// Resume the session named by the cookie, or start a fresh one.
    ///
    /// Returns the session plus the raw token to hand to the browser when a
    /// new session was created (`None` when an existing one was resumed).
    pub async fn start(&self, cookie: Option<&str>) -> AppResult<(Session, Option<String>)> {
        if let Some(raw) = cookie {
            if !raw.is_empty() {
                let hash = token::hash_token(raw);
                if let Some(session) = self.sessions.find_by_token_hash(&hash).await? {
                    return Ok((session, None));
                }
            }
        }

        let raw = token::generate_token();
        let session = self
            .sessions
            .create(&token::hash_token(&raw), self.expiry_from_now())
            .await?;
        debug!(session_id = %session.id, "Started new session");
        Ok((session, Some(raw)))
    }

    /// Rotate the session's opaque token, keeping its attributes.
    ///
    /// The old cookie value stops resolving immediately. Returns the new raw
    /// token for the replacement cookie.
    pub async fn regenerate(&self, session: &mut Session) -> AppResult<String> {
        let raw = token::generate_token();
        let hash = token::hash_token(&raw);
        let expires_at = self.expiry_from_now();
        self.sessions
            .update_token_hash(session.id, &hash, expires_at)
            .await?;
        session.token_hash = hash;
        session.expires_at = expires_at;
        debug!(session_id = %session.id, "Session token regenerated");
        Ok(raw)
    }

    /// Destroy a session outright.
    pub async fn destroy(&self, session_id: Uuid) -> AppResult<bool> {
        self.sessions.delete(session_id).await
    }

    /// Return the session's anti-CSRF token, generating it on first use.
    pub async fn issue_csrf(&self, session: &mut Session) -> AppResult<String> {
        if let Some(existing) = &session.csrf_token {
            return Ok(existing.clone());
        }
        let fresh = token::generate_token();
        self.sessions.set_csrf_token(session.id, &fresh).await?;
        session.csrf_token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Constant-time anti-CSRF check. Fails closed when the session has no
    /// token yet or the candidate is blank.
    pub fn verify_csrf(&self, session: &Session, candidate: &str) -> bool {
        match &session.csrf_token {
            Some(expected) if !candidate.is_empty() => {
                token::constant_time_eq(expected, candidate)
            }
            _ => false,
        }
    }

    /// Store the keyed checksum of a freshly rendered image challenge.
    pub async fn set_challenge_checksum(
        &self,
        session: &mut Session,
        checksum: Option<String>,
    ) -> AppResult<()> {
        self.sessions
            .set_challenge_checksum(session.id, checksum.as_deref())
            .await?;
        session.challenge_checksum = checksum;
        Ok(())
    }

    /// Record the outcome of the human-verification challenge.
    pub async fn set_challenge_verified(
        &self,
        session: &mut Session,
        verified: bool,
    ) -> AppResult<()> {
        self.sessions
            .set_challenge_verified(session.id, verified)
            .await?;
        session.challenge_verified = verified;
        Ok(())
    }

    /// Attach the authenticated identity snapshot to the session.
    ///
    /// Only the derived verify tag survives; the password hash itself is
    /// never written into session state.
    pub async fn set_identity(&self, session: &mut Session, user: &StaffUser) -> AppResult<()> {
        let tag = token::verify_tag(&user.username, &user.password_hash);
        self.sessions.set_identity(session.id, user, &tag).await?;
        session.user_id = Some(user.id);
        session.username = Some(user.username.clone());
        session.role = Some(user.role);
        session.language = Some(user.language.clone());
        session.verify_tag = Some(tag);
        Ok(())
    }

    /// Whether the session's verify tag still matches the account's current
    /// credential state. A password change invalidates old sessions here.
    pub fn identity_still_valid(&self, session: &Session, user: &StaffUser) -> bool {
        match &session.verify_tag {
            Some(tag) => token::constant_time_eq(
                tag,
                &token::verify_tag(&user.username, &user.password_hash),
            ),
            None => false,
        }
    }

    /// The configured session cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }
}
