//! Biltile Service Library
//!
//! HTTP handlers and types for the BIL16 elevation service.
//! This library is used by both the biltile-service binary and integration
//! tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use biltile::cache::TileCache;
use biltile::layer::ElevationRegistry;

/// Application state shared across handlers.
pub struct AppState {
    /// Elevation layers addressable by layer id.
    pub registry: ElevationRegistry,
    /// The tile cache shared by all layers.
    pub cache: Arc<TileCache>,
}

/// Build the service router over shared state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/elevation", get(handlers::get_elevation))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    ElevationQuery, ElevationResponse, ErrorResponse, HealthResponse, StatsResponse,
};
