//! Kinship Auth API
//!
//! Authentication service providing REST endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth_api::{router, AppState, Config};
use kinship_auth_core::{build_notifier, AuthService, NotificationDispatcher};
use kinship_db::{create_pool, run_migrations, Repositories};
use tracing_subscriber::EnvFilter;

const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Starting Kinship Auth API");

    // Database
    let pool = create_pool(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    let repos = Repositories::new(pool.clone());

    // Notifications run on their own worker
    let notifier = build_notifier(&config.smtp)?;
    let (dispatcher, notification_worker) =
        NotificationDispatcher::new(notifier, config.notification_queue_size);

    let auth = AuthService::new(
        config.auth.clone(),
        Arc::new(repos.users),
        Arc::new(repos.password_resets),
        dispatcher,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let app = router(AppState::new(auth, pool, config));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every dispatcher clone) is gone; let queued mail go out
    if tokio::time::timeout(NOTIFICATION_DRAIN_TIMEOUT, notification_worker.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("Notification queue not drained before shutdown");
    }
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Text logs by default, JSON when `LOG_FORMAT=json`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
