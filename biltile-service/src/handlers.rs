//! HTTP request handlers for the elevation service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use biltile::sampler::Elevation;
use biltile::TileError;

use crate::AppState;

/// Query parameters for the elevation endpoint.
#[derive(Debug, Deserialize)]
pub struct ElevationQuery {
    /// Layer id to sample.
    pub layer: String,
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
}

/// Successful elevation response.
#[derive(Debug, Serialize)]
pub struct ElevationResponse {
    /// Layer id queried.
    pub layer: String,
    /// Longitude queried.
    pub lon: f64,
    /// Latitude queried.
    pub lat: f64,
    /// Elevation in meters, `null` when the pixel holds no data.
    pub elevation: Option<i16>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Cache statistics response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Number of tiles in cache.
    pub cached_tiles: u64,
    /// Maximum tiles the cache holds.
    pub capacity: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Sample a layer's elevation at a position.
///
/// # Query Parameters
///
/// - `layer`: Layer id
/// - `lon`: Longitude in decimal degrees (-180 to 180)
/// - `lat`: Latitude in decimal degrees (-90 to 90)
///
/// # Returns
///
/// - `200 OK` with the elevation (`null` for a no-data pixel)
/// - `400 Bad Request` for positions outside the layer's tiling scheme
/// - `404 Not Found` for an unknown layer or an unavailable tile
#[axum::debug_handler]
pub async fn get_elevation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ElevationQuery>,
) -> impl IntoResponse {
    tracing::debug!(
        layer = %query.layer,
        lon = query.lon,
        lat = query.lat,
        "Elevation query"
    );

    let layer = match state.registry.get(&query.layer) {
        Some(layer) => layer,
        None => return error_response(&query, TileError::UnknownLayer(query.layer.clone())),
    };

    if !layer.covers(query.lon, query.lat) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "position outside the layer's tiling scheme: lon={}, lat={}",
                    query.lon, query.lat
                ),
            }),
        )
            .into_response();
    }

    let sample = layer.elevation_at(query.lon, query.lat);
    if sample.is_available() {
        tracing::info!(
            layer = %query.layer,
            lon = query.lon,
            lat = query.lat,
            elevation = ?sample.value(),
            "Elevation sampled"
        );
        (
            StatusCode::OK,
            Json(ElevationResponse {
                layer: query.layer,
                lon: query.lon,
                lat: query.lat,
                elevation: sample.value(),
            }),
        )
            .into_response()
    } else {
        unavailable_response(&query, sample)
    }
}

/// 404 for samples whose tile is not in a usable state.
fn unavailable_response(query: &ElevationQuery, sample: Elevation) -> axum::response::Response {
    let message = sample.message().unwrap_or("elevationNotAvailable");
    tracing::debug!(
        layer = %query.layer,
        lon = query.lon,
        lat = query.lat,
        message = message,
        "Elevation unavailable"
    );
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Create an error response for elevation queries.
fn error_response(query: &ElevationQuery, e: TileError) -> axum::response::Response {
    let status = match &e {
        TileError::UnknownLayer(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(layer = %query.layer, error = %e, "Elevation query failed");

    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get cache statistics.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.cache.stats();

    Json(StatsResponse {
        cached_tiles: stats.entry_count,
        capacity: stats.capacity,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    })
}
