mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use kfdash_core::{
    ConfigLoader,
    CoreContext,
};
use tower_http::cors::{
    Any,
    CorsLayer,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    kfdash_core::logging::init();

    let config = ConfigLoader::load_default().context("Failed to load config")?;
    let bind_addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind_addr))?;
    let cors_allow_all = config.server.cors_allow_all;

    tracing::info!("Starting Kfdash API server");
    tracing::info!("Bind address: {}", bind_addr);

    let core = Arc::new(
        CoreContext::from_config(config)
            .await
            .context("Failed to initialize services")?,
    );

    core.start_background_tasks().await;

    let app = Router::new()
        .nest("/api/v1", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(if cors_allow_all {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .with_state(AppState::new(Arc::clone(&core)));

    tracing::info!("Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    core.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}
