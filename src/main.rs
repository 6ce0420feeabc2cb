//! Parley server — presence tracking and realtime fan-out for chat.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use parley_auth::jwt::JwtDecoder;
use parley_cache::StoreManager;
use parley_core::config::AppConfig;
use parley_core::error::AppError;
use parley_core::traits::KeyValueStore;
use parley_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `PARLEY__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("PARLEY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("PARLEY_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&dir, &env)
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
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

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Presence store ───────────────────────────────────
    tracing::info!(provider = %config.store.provider, "Initializing presence store");
    let store: Arc<dyn KeyValueStore> = Arc::new(StoreManager::new(&config.store).await?);
    if !store.is_available() {
        tracing::warn!("Presence store unavailable, online status will not be tracked");
    }

    // ── Step 2: User directory ───────────────────────────────────
    tracing::info!(provider = %config.database.provider, "Initializing user directory");
    let directory = parley_database::build_directory(&config.database).await?;

    // ── Step 3: Credential verification ──────────────────────────
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 4: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        Arc::clone(&store),
        jwt_decoder,
        directory,
    ));

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = parley_api::AppState::new(Arc::new(config), Arc::clone(&realtime), store);
    let app = parley_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Parley server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing realtime connections");
        if tokio::time::timeout(grace, realtime.shutdown()).await.is_err() {
            tracing::warn!(grace_seconds = grace.as_secs(), "Realtime shutdown timed out");
        }
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Parley server shut down gracefully");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
