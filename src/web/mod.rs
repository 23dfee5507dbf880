//! Web view using Leptos SSR + Axum

mod assets;
mod components;
mod routes;

use crate::controller::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the router for the web view and JSON API
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Main page
        .route("/", get(routes::index))
        // API endpoints
        .route("/api/status", get(routes::api_status))
        .route("/api/scan", post(routes::api_scan))
        .route("/api/refresh", post(routes::api_refresh))
        .route("/api/clear", post(routes::api_clear))
        .route("/api/export", get(routes::api_export))
        // Static assets
        .route("/style.css", get(assets::serve_css))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server
pub async fn run_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    tracing::info!(addr = %addr, "Starting web view");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
