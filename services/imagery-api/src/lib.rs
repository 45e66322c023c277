//! Satellite imagery API service.
//!
//! Three upload endpoints behind a shared-secret gate: raster attributes
//! as JSON, an RGB thumbnail, and a color-mapped vegetation index. Each
//! request is self-contained: gate, decode, render, respond.

pub mod error;
pub mod gate;
pub mod handlers;
pub mod intake;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the service router.
///
/// Kept out of `main` so tests drive the full stack (routing, extractors,
/// error mapping) without binding a socket.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/attributes", post(handlers::attributes::attributes_handler))
        .route("/attributes/", post(handlers::attributes::attributes_handler))
        .route("/thumbnails", post(handlers::thumbnails::thumbnails_handler))
        .route("/thumbnails/", post(handlers::thumbnails::thumbnails_handler))
        .route("/ndvi", post(handlers::ndvi::ndvi_handler))
        .route("/ndvi/", post(handlers::ndvi::ndvi_handler))
        // Health (not token gated)
        .route("/health", get(handlers::health::health_handler))
        // Middleware
        .layer(Extension(state))
        // Uploads routinely exceed axum's 2 MiB default body cap.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
