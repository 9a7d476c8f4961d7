//! The login flow state machine.
//!
//! One entry point per way into the staff area: `submit` for form logins,
//! `auto_login` for the remember-me cookie pair. Both end in the same
//! success tail: identity snapshot, token regeneration, cookie policy.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use helpdesk_core::config::{AuthConfig, ServerConfig};
use helpdesk_core::messages::MessageKey;
use helpdesk_core::result::AppResult;
use helpdesk_entity::session::Session;
use helpdesk_entity::user::StaffUser;

use crate::challenge::{ChallengeGate, ChallengeVerdict};
use crate::limiter::{BruteForceLimiter, LimiterDecision};
use crate::password::PasswordHasher;
use crate::remember::{self, RememberAction, RememberPreference};
use crate::session::SessionManager;
use crate::store::UserStore;

use super::form::{FieldError, FormField, LoginForm, sanitize_redirect};

/// Terminal state of one pass through the login flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoginOutcome {
    /// Credentials accepted; the caller applies cookies and redirects.
    Success {
        /// Validated redirect target.
        redirect: String,
        /// The authenticated account.
        user: StaffUser,
        /// Raw replacement session token, set whenever the token rotated.
        session_token: Option<String>,
        /// Remember-me cookie changes to apply.
        remember: RememberAction,
        /// Non-blocking advisory (default install password).
        notice: Option<MessageKey>,
    },
    /// The form re-renders with field-level errors.
    Rejected {
        errors: Vec<FieldError>,
        notice: Option<MessageKey>,
    },
    /// Too many attempts inside the rolling window.
    Banned { retry_after_minutes: i64 },
    /// Permanently banned address.
    Denied,
}

/// Orchestrates credential checks, throttling, challenges, and the
/// post-login session handover.
#[derive(Clone)]
pub struct LoginFlow {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    sessions: Arc<SessionManager>,
    limiter: Arc<BruteForceLimiter>,
    challenge: Arc<ChallengeGate>,
    auth_config: AuthConfig,
    server_config: ServerConfig,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("auth_config", &self.auth_config)
            .finish_non_exhaustive()
    }
}

impl LoginFlow {
    /// Creates the flow with all collaborators.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        sessions: Arc<SessionManager>,
        limiter: Arc<BruteForceLimiter>,
        challenge: Arc<ChallengeGate>,
        auth_config: AuthConfig,
        server_config: ServerConfig,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
            limiter,
            challenge,
            auth_config,
            server_config,
        }
    }

    /// Process a login form submission.
    ///
    /// Field validation and the challenge run before anything touches the
    /// attempt counter or the account store, so a submission with obvious
    /// gaps costs no database writes and leaks nothing about accounts.
    pub async fn submit(
        &self,
        form: &LoginForm,
        ip: IpAddr,
        session: &mut Session,
    ) -> AppResult<LoginOutcome> {
        let mut errors = Vec::new();

        let username = form.user.as_deref().map(str::trim).unwrap_or_default();
        if username.is_empty() {
            errors.push(FieldError::new(FormField::User, MessageKey::EnterUsername));
        }
        let password = form.pass.as_deref().unwrap_or_default();
        if password.is_empty() {
            errors.push(FieldError::new(FormField::Pass, MessageKey::EnterPassword));
        }

        let answer = form
            .mysecnum
            .as_deref()
            .or(form.challenge_response.as_deref());
        match self.challenge.verify(session, answer, ip).await? {
            ChallengeVerdict::NotRequired => {}
            ChallengeVerdict::Passed => {
                self.sessions.set_challenge_verified(session, true).await?;
            }
            ChallengeVerdict::MissingAnswer => {
                errors.push(FieldError::new(
                    FormField::Challenge,
                    MessageKey::ChallengeMissing,
                ));
            }
            ChallengeVerdict::Failed => {
                errors.push(FieldError::new(
                    FormField::Challenge,
                    MessageKey::ChallengeWrong,
                ));
            }
        }

        if !errors.is_empty() {
            return Ok(LoginOutcome::Rejected {
                errors,
                notice: None,
            });
        }

        match self.limiter.check(ip, Utc::now()).await? {
            LimiterDecision::Allowed => {}
            LimiterDecision::Banned {
                retry_after_minutes,
            } => {
                self.sessions.destroy(session.id).await?;
                return Ok(LoginOutcome::Banned {
                    retry_after_minutes,
                });
            }
            LimiterDecision::Denied => {
                self.sessions.destroy(session.id).await?;
                return Ok(LoginOutcome::Denied);
            }
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            // Same message and a superset of the flagged fields compared to
            // a wrong password, so the two cases stay indistinguishable.
            // The session dies with the attempt; the caller re-renders on a
            // fresh one, which also forces the challenge to be earned again.
            self.sessions.destroy(session.id).await?;
            return Ok(LoginOutcome::Rejected {
                errors: vec![
                    FieldError::new(FormField::User, MessageKey::WrongCredentials),
                    FieldError::new(FormField::Pass, MessageKey::WrongCredentials),
                ],
                notice: None,
            });
        };

        if !self
            .hasher
            .verify_password(password, &user.password_hash)?
        {
            self.sessions.destroy(session.id).await?;
            return Ok(LoginOutcome::Rejected {
                errors: vec![FieldError::new(FormField::Pass, MessageKey::WrongCredentials)],
                notice: None,
            });
        }

        let notice = if password == self.auth_config.default_install_password {
            warn!(username = %user.username, "Login with the default install password");
            Some(MessageKey::DefaultPasswordNotice)
        } else {
            None
        };

        self.sessions.set_identity(session, &user).await?;
        // Runs exactly once per flow, only after full credential success.
        self.limiter.clear(ip).await?;

        // A passed challenge is good for exactly one credential check.
        if session.challenge_verified {
            self.sessions.set_challenge_verified(session, false).await?;
        }

        if !user.active {
            self.sessions.destroy(session.id).await?;
            return Ok(LoginOutcome::Rejected {
                errors: vec![FieldError::new(
                    FormField::Active,
                    MessageKey::InactiveAccount,
                )],
                notice: None,
            });
        }

        let session_token = Some(self.sessions.regenerate(session).await?);

        let preference = RememberPreference::from_form_value(form.remember_user.as_deref());
        let remember = remember::resolve_action(
            preference,
            self.auth_config.autologin,
            &user.username,
            &user.password_hash,
        );

        let redirect = sanitize_redirect(
            form.goto_target.as_deref(),
            &self.server_config.base_url,
            &self.server_config.default_landing_path,
        );

        info!(user_id = %user.id, username = %user.username, "Staff login successful");

        Ok(LoginOutcome::Success {
            redirect,
            user,
            session_token,
            remember,
            notice,
        })
    }

    /// Attempt a cookie-based auto-login.
    ///
    /// Returns `None` when the cookie pair does not match the account's
    /// current credential state; the caller clears both cookies then. A
    /// deny-listed address is refused outright, cookies notwithstanding.
    pub async fn auto_login(
        &self,
        username: &str,
        presented_token: &str,
        ip: IpAddr,
        session: &mut Session,
    ) -> AppResult<Option<LoginOutcome>> {
        if !self.auth_config.autologin {
            return Ok(None);
        }

        if self.limiter.is_denied(ip).await? {
            warn!(%ip, "Auto-login attempt from permanently banned address");
            return Ok(Some(LoginOutcome::Denied));
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        if !remember::remember_token_matches(presented_token, &user.password_hash, &user.username)
        {
            warn!(username = %user.username, "Auto-login cookie mismatch");
            return Ok(None);
        }

        if !user.active {
            return Ok(None);
        }

        self.sessions.set_identity(session, &user).await?;
        self.limiter.clear(ip).await?;
        let session_token = Some(self.sessions.regenerate(session).await?);

        // Refresh the cookie pair so the lifetime slides forward.
        let remember = remember::resolve_action(
            RememberPreference::AutoLogin,
            true,
            &user.username,
            &user.password_hash,
        );

        info!(user_id = %user.id, username = %user.username, "Staff auto-login successful");

        Ok(Some(LoginOutcome::Success {
            redirect: self.server_config.default_landing_path.clone(),
            user,
            session_token,
            remember,
            notice: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;
    use uuid::Uuid;

    use helpdesk_core::config::SessionConfig;
    use helpdesk_core::error::AppError;
    use helpdesk_entity::attempt::LoginAttempt;
    use helpdesk_entity::user::StaffRole;

    use crate::remember::derive_remember_token;
    use crate::store::{AttemptStore, DenyListStore, SessionStore};
    use crate::token;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9));

    struct MemUsers(Vec<StaffUser>);

    #[async_trait]
    impl UserStore for MemUsers {
        async fn find_by_username(&self, username: &str) -> AppResult<Option<StaffUser>> {
            Ok(self.0.iter().find(|u| u.username == username).cloned())
        }
    }

    #[derive(Default)]
    struct MemSessions(Mutex<HashMap<Uuid, Session>>);

    impl MemSessions {
        fn get(&self, id: Uuid) -> Option<Session> {
            self.0.lock().unwrap().get(&id).cloned()
        }

        fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SessionStore for MemSessions {
        async fn create(&self, token_hash: &str, expires_at: DateTime<Utc>) -> AppResult<Session> {
            let session = Session {
                id: Uuid::new_v4(),
                token_hash: token_hash.to_string(),
                csrf_token: None,
                challenge_verified: false,
                challenge_checksum: None,
                user_id: None,
                username: None,
                role: None,
                language: None,
                verify_tag: None,
                created_at: Utc::now(),
                expires_at,
            };
            self.0.lock().unwrap().insert(session.id, session.clone());
            Ok(session)
        }

        async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .values()
                .find(|s| s.token_hash == token_hash)
                .cloned())
        }

        async fn update_token_hash(
            &self,
            session_id: Uuid,
            new_hash: &str,
            expires_at: DateTime<Utc>,
        ) -> AppResult<()> {
            let mut map = self.0.lock().unwrap();
            let session = map
                .get_mut(&session_id)
                .ok_or_else(|| AppError::not_found("Session not found"))?;
            session.token_hash = new_hash.to_string();
            session.expires_at = expires_at;
            Ok(())
        }

        async fn set_csrf_token(&self, session_id: Uuid, csrf: &str) -> AppResult<()> {
            if let Some(session) = self.0.lock().unwrap().get_mut(&session_id) {
                session.csrf_token = Some(csrf.to_string());
            }
            Ok(())
        }

        async fn set_challenge_checksum(
            &self,
            session_id: Uuid,
            checksum: Option<&str>,
        ) -> AppResult<()> {
            if let Some(session) = self.0.lock().unwrap().get_mut(&session_id) {
                session.challenge_checksum = checksum.map(str::to_string);
            }
            Ok(())
        }

        async fn set_challenge_verified(&self, session_id: Uuid, verified: bool) -> AppResult<()> {
            if let Some(session) = self.0.lock().unwrap().get_mut(&session_id) {
                session.challenge_verified = verified;
            }
            Ok(())
        }

        async fn set_identity(
            &self,
            session_id: Uuid,
            user: &StaffUser,
            verify_tag: &str,
        ) -> AppResult<()> {
            if let Some(session) = self.0.lock().unwrap().get_mut(&session_id) {
                session.user_id = Some(user.id);
                session.username = Some(user.username.clone());
                session.role = Some(user.role);
                session.language = Some(user.language.clone());
                session.verify_tag = Some(verify_tag.to_string());
            }
            Ok(())
        }

        async fn delete(&self, session_id: Uuid) -> AppResult<bool> {
            Ok(self.0.lock().unwrap().remove(&session_id).is_some())
        }
    }

    #[derive(Default)]
    struct MemAttempts(Mutex<HashMap<String, LoginAttempt>>);

    impl MemAttempts {
        fn failures(&self, ip: &str) -> Option<i32> {
            self.0.lock().unwrap().get(ip).map(|a| a.failures)
        }

        fn is_empty(&self) -> bool {
            self.0.lock().unwrap().is_empty()
        }
    }

    #[async_trait]
    impl AttemptStore for MemAttempts {
        async fn find(&self, ip: &str) -> AppResult<Option<LoginAttempt>> {
            Ok(self.0.lock().unwrap().get(ip).cloned())
        }

        async fn upsert(
            &self,
            ip: &str,
            failures: i32,
            last_attempt: DateTime<Utc>,
        ) -> AppResult<()> {
            self.0.lock().unwrap().insert(
                ip.to_string(),
                LoginAttempt {
                    ip: ip.to_string(),
                    failures,
                    last_attempt,
                },
            );
            Ok(())
        }

        async fn delete(&self, ip: &str) -> AppResult<bool> {
            Ok(self.0.lock().unwrap().remove(ip).is_some())
        }
    }

    struct NoDeny;

    #[async_trait]
    impl DenyListStore for NoDeny {
        async fn is_banned(&self, _ip_long: i64) -> AppResult<bool> {
            Ok(false)
        }
    }

    struct DenyAll;

    #[async_trait]
    impl DenyListStore for DenyAll {
        async fn is_banned(&self, _ip_long: i64) -> AppResult<bool> {
            Ok(true)
        }
    }

    struct Harness {
        flow: LoginFlow,
        manager: Arc<SessionManager>,
        sessions: Arc<MemSessions>,
        attempts: Arc<MemAttempts>,
    }

    fn auth_config(attempt_limit: u32) -> AuthConfig {
        AuthConfig {
            attempt_limit,
            attempt_ban_minutes: 15,
            autologin: true,
            remember_ttl_days: 365,
            default_install_password: "admin".to_string(),
        }
    }

    fn harness(users: Vec<StaffUser>, attempt_limit: u32, deny_all: bool) -> Harness {
        let sessions = Arc::new(MemSessions::default());
        let attempts = Arc::new(MemAttempts::default());
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&sessions) as Arc<dyn SessionStore>,
            SessionConfig {
                cookie_name: "hd_session".to_string(),
                cookie_secure: false,
                ttl_hours: 12,
            },
        ));
        let deny_list: Arc<dyn DenyListStore> = if deny_all {
            Arc::new(DenyAll)
        } else {
            Arc::new(NoDeny)
        };
        let limiter = Arc::new(BruteForceLimiter::new(
            Arc::clone(&attempts) as Arc<dyn AttemptStore>,
            deny_list,
            auth_config(attempt_limit),
        ));
        let flow = LoginFlow::new(
            Arc::new(MemUsers(users)) as Arc<dyn UserStore>,
            Arc::new(PasswordHasher::new()),
            Arc::clone(&manager),
            limiter,
            Arc::new(ChallengeGate::Disabled),
            auth_config(attempt_limit),
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                base_url: "http://localhost".to_string(),
                default_landing_path: "/admin/home".to_string(),
                shutdown_grace_seconds: 5,
            },
        );
        Harness {
            flow,
            manager,
            sessions,
            attempts,
        }
    }

    fn staff_user(username: &str, password: &str, active: bool) -> StaffUser {
        StaffUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: PasswordHasher::new().hash_password(password).unwrap(),
            name: None,
            email: None,
            active,
            role: StaffRole::Staff,
            language: "en".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn login_form(user: &str, pass: &str) -> LoginForm {
        LoginForm {
            user: Some(user.to_string()),
            pass: Some(pass.to_string()),
            ..LoginForm::default()
        }
    }

    async fn fresh_session(h: &Harness) -> Session {
        h.manager.start(None).await.unwrap().0
    }

    #[tokio::test]
    async fn wrong_credentials_destroy_the_session_either_way() {
        let h = harness(vec![staff_user("alice", "s3cret", true)], 5, false);

        let mut first = fresh_session(&h).await;
        let unknown = h.flow.submit(&login_form("bob", "x"), IP, &mut first).await.unwrap();
        let mut second = fresh_session(&h).await;
        let mismatch = h
            .flow
            .submit(&login_form("alice", "x"), IP, &mut second)
            .await
            .unwrap();

        assert_eq!(h.sessions.len(), 0);
        let LoginOutcome::Rejected { errors: a, .. } = unknown else {
            panic!("expected rejection for unknown account");
        };
        let LoginOutcome::Rejected { errors: b, .. } = mismatch else {
            panic!("expected rejection for wrong password");
        };
        // Unknown account and wrong password carry the same message.
        assert!(a.iter().all(|e| e.message == MessageKey::WrongCredentials));
        assert!(b.iter().all(|e| e.message == MessageKey::WrongCredentials));
    }

    #[tokio::test]
    async fn counter_bans_after_the_limit() {
        let h = harness(vec![staff_user("alice", "s3cret", true)], 3, false);

        for _ in 0..3 {
            let mut session = fresh_session(&h).await;
            let outcome = h
                .flow
                .submit(&login_form("alice", "nope"), IP, &mut session)
                .await
                .unwrap();
            assert!(matches!(outcome, LoginOutcome::Rejected { .. }));
        }
        assert_eq!(h.attempts.failures(&IP.to_string()), Some(3));

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .submit(&login_form("alice", "s3cret"), IP, &mut session)
            .await
            .unwrap();
        let LoginOutcome::Banned {
            retry_after_minutes,
        } = outcome
        else {
            panic!("expected the limiter to ban the address");
        };
        assert!(retry_after_minutes >= 1);
        assert_eq!(h.sessions.len(), 0);
    }

    #[tokio::test]
    async fn success_clears_counter_and_rotates_the_token() {
        let h = harness(vec![staff_user("alice", "s3cret", true)], 5, false);

        let mut session = fresh_session(&h).await;
        h.flow
            .submit(&login_form("alice", "nope"), IP, &mut session)
            .await
            .unwrap();
        assert_eq!(h.attempts.failures(&IP.to_string()), Some(1));

        let (mut session, raw) = h.manager.start(None).await.unwrap();
        let old_hash = session.token_hash.clone();
        let outcome = h
            .flow
            .submit(&login_form("alice", "s3cret"), IP, &mut session)
            .await
            .unwrap();

        let LoginOutcome::Success { session_token, .. } = outcome else {
            panic!("expected a successful login");
        };
        let new_raw = session_token.expect("token must rotate on login");
        assert_ne!(Some(new_raw.clone()), raw);
        assert_ne!(token::hash_token(&new_raw), old_hash);
        assert_eq!(h.sessions.get(session.id).unwrap().token_hash, token::hash_token(&new_raw));
        assert!(h.attempts.is_empty());
    }

    #[tokio::test]
    async fn inactive_account_rejected_after_credential_success() {
        let h = harness(vec![staff_user("alice", "s3cret", false)], 5, false);

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .submit(&login_form("alice", "s3cret"), IP, &mut session)
            .await
            .unwrap();

        let LoginOutcome::Rejected { errors, .. } = outcome else {
            panic!("expected rejection for inactive account");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, FormField::Active);
        assert_eq!(errors[0].message, MessageKey::InactiveAccount);
        // Credentials were right: counter cleared, but no session survives.
        assert!(h.attempts.is_empty());
        assert_eq!(h.sessions.len(), 0);
    }

    #[tokio::test]
    async fn default_install_password_sets_a_notice() {
        let h = harness(vec![staff_user("alice", "admin", true)], 5, false);

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .submit(&login_form("alice", "admin"), IP, &mut session)
            .await
            .unwrap();

        let LoginOutcome::Success { notice, .. } = outcome else {
            panic!("expected a successful login");
        };
        assert_eq!(notice, Some(MessageKey::DefaultPasswordNotice));
    }

    #[tokio::test]
    async fn passed_challenge_is_consumed_on_success() {
        let h = harness(vec![staff_user("alice", "s3cret", true)], 5, false);

        let mut session = fresh_session(&h).await;
        h.manager
            .set_challenge_verified(&mut session, true)
            .await
            .unwrap();
        let outcome = h
            .flow
            .submit(&login_form("alice", "s3cret"), IP, &mut session)
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::Success { .. }));
        assert!(!h.sessions.get(session.id).unwrap().challenge_verified);
    }

    #[tokio::test]
    async fn denied_address_never_touches_the_counter() {
        let h = harness(vec![staff_user("alice", "s3cret", true)], 5, true);

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .submit(&login_form("alice", "s3cret"), IP, &mut session)
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::Denied));
        assert!(h.attempts.is_empty());
        assert_eq!(h.sessions.len(), 0);
    }

    #[tokio::test]
    async fn auto_login_clears_the_counter() {
        let user = staff_user("alice", "s3cret", true);
        let derived = derive_remember_token(&user.password_hash, &user.username);
        let h = harness(vec![user], 5, false);

        h.attempts
            .upsert(&IP.to_string(), 2, Utc::now())
            .await
            .unwrap();

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .auto_login("alice", &derived, IP, &mut session)
            .await
            .unwrap();

        assert!(matches!(outcome, Some(LoginOutcome::Success { .. })));
        assert!(h.attempts.is_empty());
    }

    #[tokio::test]
    async fn auto_login_refuses_a_denied_address() {
        let user = staff_user("alice", "s3cret", true);
        let derived = derive_remember_token(&user.password_hash, &user.username);
        let h = harness(vec![user], 5, true);

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .auto_login("alice", &derived, IP, &mut session)
            .await
            .unwrap();

        assert!(matches!(outcome, Some(LoginOutcome::Denied)));
    }

    #[tokio::test]
    async fn auto_login_rejects_a_stale_cookie_pair() {
        let user = staff_user("alice", "s3cret", true);
        let h = harness(vec![user], 5, false);

        let mut session = fresh_session(&h).await;
        let outcome = h
            .flow
            .auto_login("alice", "not-the-derived-token", IP, &mut session)
            .await
            .unwrap();

        assert!(outcome.is_none());
    }
}
