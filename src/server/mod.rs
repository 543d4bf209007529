mod handlers;
mod state;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::location::LocationService;
pub use state::AppState;

pub fn build_router(service: Option<LocationService>) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/reverse", get(handlers::reverse_geocode))
        .route("/api/route", get(handlers::route))
        .route("/api/distance", get(handlers::distance))
        .route("/api/geofence/contains", post(handlers::geofence_contains))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, service: Option<LocationService>) -> Result<()> {
    if service.is_none() {
        tracing::warn!("no API key configured; only /api/geofence/contains will succeed");
    }

    let app = build_router(service);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {}", addr))?;

    info!("location services listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
