//! HTTP surface tests that run without a live database.
//!
//! The pool is created lazily, so routing, extraction, and error mapping
//! can be exercised even when PostgreSQL is absent.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use helpdesk_api::AppState;
use helpdesk_core::config::AppConfig;
use helpdesk_core::messages::MessageCatalog;

fn test_app() -> Router {
    let config = AppConfig::load("nonexistent-overlay").expect("Failed to load default config");

    let db_pool = helpdesk_database::DatabasePool::connect_lazy(&config.database)
        .expect("Failed to build lazy pool")
        .into_pool();

    let user_repo = Arc::new(helpdesk_database::repositories::UserRepository::new(
        db_pool.clone(),
    ));
    let session_repo = Arc::new(helpdesk_database::repositories::SessionRepository::new(
        db_pool.clone(),
    ));
    let attempt_repo = Arc::new(helpdesk_database::repositories::AttemptRepository::new(
        db_pool.clone(),
    ));
    let banned_repo = Arc::new(helpdesk_database::repositories::BannedIpRepository::new(
        db_pool.clone(),
    ));
    let ticket_repo = Arc::new(helpdesk_database::repositories::TicketRepository::new(
        db_pool.clone(),
    ));
    let audit_repo = Arc::new(helpdesk_database::repositories::AuditRepository::new(
        db_pool.clone(),
    ));

    let password_hasher = Arc::new(helpdesk_auth::password::PasswordHasher::new());
    let session_manager = Arc::new(helpdesk_auth::session::SessionManager::new(
        Arc::clone(&session_repo) as Arc<dyn helpdesk_auth::store::SessionStore>,
        config.session.clone(),
    ));
    let limiter = Arc::new(helpdesk_auth::limiter::BruteForceLimiter::new(
        Arc::clone(&attempt_repo) as Arc<dyn helpdesk_auth::store::AttemptStore>,
        Arc::clone(&banned_repo) as Arc<dyn helpdesk_auth::store::DenyListStore>,
        config.auth.clone(),
    ));
    let challenge_gate = Arc::new(helpdesk_auth::challenge::ChallengeGate::from_config(
        &config.challenge,
    ));
    let login_flow = Arc::new(helpdesk_auth::login::LoginFlow::new(
        Arc::clone(&user_repo) as Arc<dyn helpdesk_auth::store::UserStore>,
        Arc::clone(&password_hasher),
        Arc::clone(&session_manager),
        Arc::clone(&limiter),
        Arc::clone(&challenge_gate),
        config.auth.clone(),
        config.server.clone(),
    ));

    let notifier: Arc<dyn helpdesk_service::CustomerNotifier> =
        Arc::new(helpdesk_service::NoopNotifier);
    let autoclose_service = Arc::new(helpdesk_service::AutoCloseService::new(
        Arc::clone(&ticket_repo) as Arc<dyn helpdesk_service::TicketStore>,
        Arc::clone(&audit_repo) as Arc<dyn helpdesk_service::AuditSink>,
        notifier,
        config.autoclose.clone(),
    ));

    helpdesk_api::build_router(AppState {
        config: Arc::new(config),
        messages: Arc::new(MessageCatalog::builtin()),
        db_pool,
        user_repo,
        session_repo,
        attempt_repo,
        banned_repo,
        ticket_repo,
        audit_repo,
        password_hasher,
        session_manager,
        limiter,
        challenge_gate,
        challenge_renderer: Arc::new(helpdesk_api::render::UnconfiguredRenderer),
        login_flow,
        autoclose_service,
    })
}

#[tokio::test]
async fn health_answers_without_database() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_introspection_requires_a_cookie() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_routes_return_not_found() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
