use std::net::SocketAddr;
use std::sync::Arc;

use mediakit_api::config::AppConfig;
use mediakit_api::domain::short_links::run_cleanup_loop;
use mediakit_api::{AppState, build_app, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(&config.logging);

    let state = Arc::new(AppState::from_config(config)?);

    if state.image_gen.is_none() {
        tracing::warn!("HF_ACCESS_TOKEN not set, /api/generate-image will answer 503");
    }

    // Expired links are also dropped lazily on lookup; the sweep bounds memory.
    tokio::spawn(run_cleanup_loop(
        state.short_links.clone(),
        state.config.cleanup_interval,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cleanup_interval_secs = state.config.cleanup_interval.as_secs(),
        rate_limit = state.config.rate_limit_enabled,
        "listening"
    );

    let app = build_app(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
