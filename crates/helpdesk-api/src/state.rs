//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use sqlx::PgPool;

use helpdesk_auth::challenge::ChallengeGate;
use helpdesk_auth::limiter::BruteForceLimiter;
use helpdesk_auth::login::LoginFlow;
use helpdesk_auth::password::PasswordHasher;
use helpdesk_auth::session::SessionManager;
use helpdesk_core::config::AppConfig;
use helpdesk_core::messages::MessageCatalog;
use helpdesk_service::autoclose::AutoCloseService;

use crate::render::ChallengeImageRenderer;

use helpdesk_database::repositories::attempt::AttemptRepository;
use helpdesk_database::repositories::audit::AuditRepository;
use helpdesk_database::repositories::banned_ip::BannedIpRepository;
use helpdesk_database::repositories::session::SessionRepository;
use helpdesk_database::repositories::ticket::TicketRepository;
use helpdesk_database::repositories::user::UserRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Localized message catalog
    pub messages: Arc<MessageCatalog>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Repositories ─────────────────────────────────────────
    /// Staff user repository
    pub user_repo: Arc<UserRepository>,
    /// Session repository
    pub session_repo: Arc<SessionRepository>,
    /// Login attempt counter repository
    pub attempt_repo: Arc<AttemptRepository>,
    /// Permanent deny-list repository
    pub banned_repo: Arc<BannedIpRepository>,
    /// Ticket repository
    pub ticket_repo: Arc<TicketRepository>,
    /// Audit trail repository
    pub audit_repo: Arc<AuditRepository>,

    // ── Auth ─────────────────────────────────────────────────
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
    /// Brute-force limiter
    pub limiter: Arc<BruteForceLimiter>,
    /// Human-verification challenge gate
    pub challenge_gate: Arc<ChallengeGate>,
    /// Renderer for the image challenge endpoint
    pub challenge_renderer: Arc<dyn ChallengeImageRenderer>,
    /// Login flow state machine
    pub login_flow: Arc<LoginFlow>,

    // ── Services ─────────────────────────────────────────────
    /// Stale-ticket auto-closer
    pub autoclose_service: Arc<AutoCloseService>,
}
