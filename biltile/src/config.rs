//! Layer configuration and composition.
//!
//! [`LayerConfig`] describes one WMS elevation layer and knows how to build
//! the cache/loader/layer trio from it. Service and CLI binaries configure
//! it from `BILTILE_*` environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BILTILE_WMS_URL` | WMS endpoint serving BIL16 tiles | Required |
//! | `BILTILE_WMS_LAYER` | WMS layer name | Required |
//! | `BILTILE_LAYER_ID` | Layer id used for cache keys | value of `BILTILE_WMS_LAYER` |
//! | `BILTILE_CRS` | `EPSG:4326` or `EPSG:3857` | `EPSG:4326` |
//! | `BILTILE_ZOOM` | Zoom level tiles are requested at | 7 |
//! | `BILTILE_TILE_SIZE` | Tile width/height in samples | 256 |
//! | `BILTILE_NO_DATA` | No-data sentinel | -9999 |
//! | `BILTILE_LITTLE_ENDIAN` | Whether samples are little-endian | false |
//! | `BILTILE_CACHE_SIZE` | Maximum tiles in cache | 100 |

use std::sync::Arc;

use crate::cache::{TileCache, DEFAULT_CAPACITY};
use crate::decode::DEFAULT_NO_DATA;
use crate::error::{Result, TileError};
use crate::layer::WmsElevationLayer;
use crate::loader::TileLoader;
use crate::sampler::{DecodeParams, DEFAULT_TILE_SIZE};
use crate::scheme::TilingScheme;
use crate::wms::WmsSource;

/// Default zoom level for elevation tile requests.
const DEFAULT_ZOOM: u8 = 7;

/// Configuration for one WMS elevation layer.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// WMS endpoint URL.
    pub wms_url: String,
    /// WMS layer name.
    pub wms_layer: String,
    /// Layer id used in cache keys (defaults to the WMS layer name).
    pub layer_id: String,
    /// Tiling scheme.
    pub scheme: TilingScheme,
    /// Zoom level tiles are requested at.
    pub zoom: u8,
    /// Decode parameters.
    pub params: DecodeParams,
    /// Cache capacity in tiles.
    pub cache_capacity: usize,
}

impl LayerConfig {
    /// Create a configuration with defaults for everything but the endpoint.
    pub fn new(wms_url: impl Into<String>, wms_layer: impl Into<String>) -> Self {
        let wms_layer = wms_layer.into();
        Self {
            wms_url: wms_url.into(),
            layer_id: wms_layer.clone(),
            wms_layer,
            scheme: TilingScheme::Geographic,
            zoom: DEFAULT_ZOOM,
            params: DecodeParams::default(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Read the configuration from `BILTILE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `BILTILE_WMS_URL` or `BILTILE_WMS_LAYER` is not
    /// set, or if `BILTILE_CRS` names an unsupported CRS.
    pub fn from_env() -> Result<Self> {
        let wms_url = require_env("BILTILE_WMS_URL")?;
        let wms_layer = require_env("BILTILE_WMS_LAYER")?;
        let mut config = Self::new(wms_url, wms_layer);

        if let Ok(id) = std::env::var("BILTILE_LAYER_ID") {
            config.layer_id = id;
        }
        if let Ok(crs) = std::env::var("BILTILE_CRS") {
            config.scheme = parse_crs(&crs)?;
        }
        if let Some(zoom) = parse_env("BILTILE_ZOOM") {
            config.zoom = zoom;
        }
        if let Some(size) = parse_env("BILTILE_TILE_SIZE") {
            config.params.tile_size = size;
        }
        if let Some(no_data) = parse_env("BILTILE_NO_DATA") {
            config.params.no_data = no_data;
        }
        if let Ok(flag) = std::env::var("BILTILE_LITTLE_ENDIAN") {
            config.params.little_endian = flag.eq_ignore_ascii_case("true") || flag == "1";
        }
        if let Some(capacity) = parse_env("BILTILE_CACHE_SIZE") {
            config.cache_capacity = capacity;
        }

        Ok(config)
    }

    /// Set the layer id.
    pub fn layer_id(mut self, id: impl Into<String>) -> Self {
        self.layer_id = id.into();
        self
    }

    /// Set the tiling scheme.
    pub fn scheme(mut self, scheme: TilingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the request zoom level.
    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the decode parameters.
    pub fn params(mut self, params: DecodeParams) -> Self {
        self.params = params;
        self
    }

    /// Set the cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the cache, loader, and layer this configuration describes.
    pub fn build(&self) -> Result<(Arc<TileCache>, Arc<TileLoader>, Arc<WmsElevationLayer>)> {
        let cache = Arc::new(TileCache::new(self.cache_capacity));
        let loader = Arc::new(TileLoader::new(cache.clone())?);
        let layer = Arc::new(WmsElevationLayer::new(
            self.layer_id.clone(),
            WmsSource::new(self.wms_url.clone(), self.wms_layer.clone()),
            self.scheme,
            self.zoom,
            self.params,
            loader.clone(),
        ));
        Ok((cache, loader, layer))
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| TileError::Config(format!("{} not set", name)))
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Map a CRS identifier to its tiling scheme.
pub fn parse_crs(crs: &str) -> Result<TilingScheme> {
    match crs.trim().to_ascii_uppercase().as_str() {
        "EPSG:4326" | "CRS:84" => Ok(TilingScheme::Geographic),
        "EPSG:3857" | "OSGEO:41001" => Ok(TilingScheme::WebMercator),
        other => Err(TileError::Config(format!("unsupported CRS: {}", other))),
    }
}
