//! Persistence seams for the auth components.
//!
//! The session manager, limiter, and login flow talk to storage through
//! these traits instead of the concrete repositories, so the flow logic
//! can be exercised against in-memory stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use helpdesk_core::result::AppResult;
use helpdesk_database::repositories::{
    AttemptRepository, BannedIpRepository, SessionRepository, UserRepository,
};
use helpdesk_entity::attempt::LoginAttempt;
use helpdesk_entity::session::Session;
use helpdesk_entity::user::StaffUser;

/// Staff account lookups.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find an account by exact, case-sensitive username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<StaffUser>>;
}

/// Server-side session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, token_hash: &str, expires_at: DateTime<Utc>) -> AppResult<Session>;
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;
    async fn update_token_hash(
        &self,
        session_id: Uuid,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
    async fn set_csrf_token(&self, session_id: Uuid, token: &str) -> AppResult<()>;
    async fn set_challenge_checksum(
        &self,
        session_id: Uuid,
        checksum: Option<&str>,
    ) -> AppResult<()>;
    async fn set_challenge_verified(&self, session_id: Uuid, verified: bool) -> AppResult<()>;
    async fn set_identity(
        &self,
        session_id: Uuid,
        user: &StaffUser,
        verify_tag: &str,
    ) -> AppResult<()>;
    async fn delete(&self, session_id: Uuid) -> AppResult<bool>;
}

/// Per-address failed-attempt counters.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn find(&self, ip: &str) -> AppResult<Option<LoginAttempt>>;
    async fn upsert(&self, ip: &str, failures: i32, last_attempt: DateTime<Utc>) -> AppResult<()>;
    async fn delete(&self, ip: &str) -> AppResult<bool>;
}

/// The permanent address deny-list.
#[async_trait]
pub trait DenyListStore: Send + Sync {
    async fn is_banned(&self, ip_long: i64) -> AppResult<bool>;
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<StaffUser>> {
        UserRepository::find_by_username(self, username).await
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, token_hash: &str, expires_at: DateTime<Utc>) -> AppResult<Session> {
        SessionRepository::create(self, token_hash, expires_at).await
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        SessionRepository::find_by_token_hash(self, token_hash).await
    }

    async fn update_token_hash(
        &self,
        session_id: Uuid,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        SessionRepository::update_token_hash(self, session_id, new_hash, expires_at).await
    }

    async fn set_csrf_token(&self, session_id: Uuid, token: &str) -> AppResult<()> {
        SessionRepository::set_csrf_token(self, session_id, token).await
    }

    async fn set_challenge_checksum(
        &self,
        session_id: Uuid,
        checksum: Option<&str>,
    ) -> AppResult<()> {
        SessionRepository::set_challenge_checksum(self, session_id, checksum).await
    }

    async fn set_challenge_verified(&self, session_id: Uuid, verified: bool) -> AppResult<()> {
        SessionRepository::set_challenge_verified(self, session_id, verified).await
    }

    async fn set_identity(
        &self,
        session_id: Uuid,
        user: &StaffUser,
        verify_tag: &str,
    ) -> AppResult<()> {
        SessionRepository::set_identity(self, session_id, user, verify_tag).await
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<bool> {
        SessionRepository::delete(self, session_id).await
    }
}

#[async_trait]
impl AttemptStore for AttemptRepository {
    async fn find(&self, ip: &str) -> AppResult<Option<LoginAttempt>> {
        AttemptRepository::find(self, ip).await
    }

    async fn upsert(&self, ip: &str, failures: i32, last_attempt: DateTime<Utc>) -> AppResult<()> {
        AttemptRepository::upsert(self, ip, failures, last_attempt).await
    }

    async fn delete(&self, ip: &str) -> AppResult<bool> {
        AttemptRepository::delete(self, ip).await
    }
}

#[async_trait]
impl DenyListStore for BannedIpRepository {
    async fn is_banned(&self, ip_long: i64) -> AppResult<bool> {
        BannedIpRepository::is_banned(self, ip_long).await
    }
}
