//! Biltile Service - HTTP service for WMS BIL16 elevation queries.
//!
//! A REST API over the shared elevation tile cache: sample any attached
//! layer's elevation at a position, and inspect cache statistics.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BILTILE_WMS_URL` | WMS endpoint serving BIL16 tiles | Required |
//! | `BILTILE_WMS_LAYER` | WMS layer name | Required |
//! | `BILTILE_LAYER_ID` | Layer id used for cache keys | WMS layer name |
//! | `BILTILE_CRS` | `EPSG:4326` or `EPSG:3857` | `EPSG:4326` |
//! | `BILTILE_ZOOM` | Zoom level tiles are requested at | 7 |
//! | `BILTILE_CACHE_SIZE` | Maximum tiles in cache | 100 |
//! | `BILTILE_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /elevation?layer=X&lon=Y&lat=Z` - Sample a layer at a position
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics

use std::net::SocketAddr;
use std::sync::Arc;

use biltile::cache::TileCache;
use biltile::layer::ElevationRegistry;
use biltile::LayerConfig;
use biltile_service::{app, AppState};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biltile_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("BILTILE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // Build the configured layer from BILTILE_* environment variables.
    // Without a WMS endpoint the service still starts, with no layers
    // attached and an empty cache.
    let registry = ElevationRegistry::new();
    let cache = match LayerConfig::from_env() {
        Ok(config) => {
            let (cache, _loader, layer) = config.build()?;
            tracing::info!(
                layer = %config.layer_id,
                wms_url = %config.wms_url,
                scheme = ?config.scheme,
                zoom = config.zoom,
                cache_capacity = config.cache_capacity,
                "Attached elevation layer"
            );
            registry.attach(layer);
            cache
        }
        Err(e) => {
            tracing::warn!(error = %e, "No WMS layer configured, starting with empty registry");
            Arc::new(TileCache::default())
        }
    };

    let state = Arc::new(AppState { registry, cache });

    // Build router
    let router = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
