pub mod handlers;
pub mod intake;
pub mod types;

use crate::{Result, config::Config, predictor::ModelRegistry};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::{AppState, TEXT_MAX_MB};
use intake::{BYTES_PER_MB, UploadSettings};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn build_state(config: &Config) -> AppState {
    let registry = ModelRegistry::new(
        config.models.clone(),
        Duration::from_secs(config.server.predict_timeout_secs),
    );
    let uploads = UploadSettings::new(
        config.server.upload_dir.clone(),
        config.server.limits.clone(),
    );

    AppState {
        registry: Arc::new(registry),
        uploads: Arc::new(uploads),
    }
}

/// Upload routes stream the body themselves and enforce per-modality ceilings,
/// so the default body limit is lifted for them.
pub fn router(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/analyze_image", post(handlers::analyze_image))
        .route("/analyze_image/", post(handlers::analyze_image))
        .route("/analyze_video", post(handlers::analyze_video))
        .route("/analyze_video/", post(handlers::analyze_video))
        .route("/analyze_audio", post(handlers::analyze_audio))
        .route("/analyze_audio/", post(handlers::analyze_audio))
        .layer(DefaultBodyLimit::disable());

    let text = Router::new()
        .route("/analyze_text", post(handlers::analyze_text))
        .route("/analyze_text/", post(handlers::analyze_text))
        .layer(DefaultBodyLimit::max((TEXT_MAX_MB * BYTES_PER_MB) as usize));

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/ping/", get(handlers::ping))
        .merge(text)
        .merge(uploads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    if let Some(dir) = &config.server.upload_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let state = build_state(&config);
    let registry = state.registry.clone();
    let app = router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
