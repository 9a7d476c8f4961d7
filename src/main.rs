//! Helpdesk Server — staff authentication and session security service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use helpdesk_core::config::AppConfig;
use helpdesk_core::error::AppError;
use helpdesk_core::messages::MessageCatalog;

#[tokio::main]
async fn main() {
    let env = std::env::var("HELPDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting helpdesk server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = helpdesk_database::DatabasePool::connect(&config.database).await?;
    db.run_migrations().await?;
    let db_pool = db.into_pool();

    // ── Step 2: Repositories ─────────────────────────────────────
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

    // ── Step 3: Auth components ──────────────────────────────────
    tracing::info!("Initializing authentication components...");
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

    // ── Step 4: Services ─────────────────────────────────────────
    let notifier: Arc<dyn helpdesk_service::CustomerNotifier> =
        Arc::new(helpdesk_service::NoopNotifier);
    let autoclose_service = Arc::new(helpdesk_service::AutoCloseService::new(
        Arc::clone(&ticket_repo) as Arc<dyn helpdesk_service::TicketStore>,
        Arc::clone(&audit_repo) as Arc<dyn helpdesk_service::AuditSink>,
        notifier,
        config.autoclose.clone(),
    ));

    // ── Step 5: Background pruning ───────────────────────────────
    spawn_pruning_task(
        Arc::clone(&session_repo),
        Arc::clone(&attempt_repo),
        config.auth.attempt_ban_minutes,
    );

    // ── Step 6: HTTP server ──────────────────────────────────────
    let app_state = helpdesk_api::AppState {
        config: Arc::new(config.clone()),
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
    };

    let app = helpdesk_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Helpdesk server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Helpdesk server shut down gracefully");
    Ok(())
}

/// Periodically prune expired sessions and stale attempt counters.
///
/// Counters older than the ban window would be reset on their next
/// attempt anyway; deleting them keeps both tables from growing without
/// bound.
fn spawn_pruning_task(
    sessions: Arc<helpdesk_database::repositories::SessionRepository>,
    attempts: Arc<helpdesk_database::repositories::AttemptRepository>,
    ban_minutes: i64,
) {
    const PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(15 * 60);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();

            match sessions.cleanup_expired(now).await {
                Ok(n) if n > 0 => tracing::info!(pruned = n, "Pruned expired sessions"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Session pruning failed"),
            }

            let stale_before = now - chrono::Duration::minutes(ban_minutes);
            match attempts.cleanup_stale(stale_before).await {
                Ok(n) if n > 0 => tracing::info!(pruned = n, "Pruned stale attempt counters"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Attempt counter pruning failed"),
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            tracing::info!("Shutdown signal received (SIGTERM)");
        },
    }
}
