// src/main.rs

use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use nova_backend::api::app_router;
use nova_backend::config::CONFIG;
use nova_backend::db;
use nova_backend::state::AppState;
use tower_http::cors::{Any, CorsLayer};

/// Graceful shutdown signal handler for SIGTERM and Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting CodeNova backend");
    info!(
        "Gemini reviewer: {}",
        if CONFIG.gemini.is_configured() {
            "configured"
        } else {
            "not configured (mock mode)"
        }
    );

    let pool = db::connect(&CONFIG.database.url, CONFIG.database.max_connections).await?;
    db::init_schema(&pool).await?;
    info!("Database schema ready");

    let app_state = Arc::new(AppState::new(pool)?);

    let app = app_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Listening on http://{}", bind_address);
    info!("Health endpoints: /health, /live");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");

    Ok(())
}
