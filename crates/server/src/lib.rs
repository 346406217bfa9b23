//! # ck-server
//!
//! HTTP front end for clusterkit. Exposes the process supervisor to the
//! browser client: runs are started with a POST and stream their events back
//! as NDJSON in the response body.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/status", get(routes::get_status))
        .route("/deploy", post(routes::deploy))
        .route("/uninstall", post(routes::uninstall))
        .route("/abort", post(routes::abort))
        .route("/generate", post(routes::generate))
        .route("/probe", post(routes::probe_hosts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router on `bind` until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
