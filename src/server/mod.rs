pub mod handlers;
pub mod types;

use crate::{config::Config, diagnosis, diagnosis::DiagnosisEngine, Result};
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Builds the application router around a diagnosis engine.
pub fn router(engine: Arc<dyn DiagnosisEngine>) -> Router {
    let app_state = handlers::AppState { engine };

    Router::new()
        .route("/diagnose", post(handlers::diagnose))
        // Phone photos plus an audio clip; the 2MB default is far too small
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        // The mobile client and browser demos call from other origins
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn run(config: Config) -> Result<()> {
    let engine = diagnosis::build_engine(&config.engine)?;
    let app = router(engine);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
