//! Elevation layers and the per-map layer registry.
//!
//! An elevation layer ties a WMS source, a tiling scheme, and decode
//! parameters to the shared cache and loader. The map engine drives it from
//! two directions: tile-visible events call [`WmsElevationLayer::request_tile`],
//! and elevation readouts call [`ElevationLayer::elevation_at`].
//!
//! Multiple elevation layers can coexist on one map; the
//! [`ElevationRegistry`] keeps them addressable by layer id.

use std::sync::{Arc, RwLock};

use crate::error::{Result, TileError};
use crate::key::{TileCoord, TileKey};
use crate::loader::{LoadOutcome, TileLoader};
use crate::sampler::{sample_elevation, DecodeParams, Elevation};
use crate::scheme::TilingScheme;
use crate::wms::WmsSource;

/// A map layer that can be queried for elevation at a geographic position.
pub trait ElevationLayer: Send + Sync {
    /// Unique id of this layer on the map.
    fn id(&self) -> &str;

    /// Whether a position falls inside this layer's tiling scheme.
    fn covers(&self, lon: f64, lat: f64) -> bool;

    /// Sample the elevation at a longitude/latitude position.
    ///
    /// Synchronous and non-blocking: only already-cached tiles are
    /// consulted. Positions outside the layer's tiling scheme report
    /// [`Elevation::NoData`].
    fn elevation_at(&self, lon: f64, lat: f64) -> Elevation;
}

/// A WMS-backed BIL16 elevation layer.
pub struct WmsElevationLayer {
    id: String,
    source: WmsSource,
    scheme: TilingScheme,
    /// Zoom level at which elevation tiles are requested and sampled.
    zoom: u8,
    params: DecodeParams,
    loader: Arc<TileLoader>,
}

impl WmsElevationLayer {
    /// Create a layer over a shared loader (and through it, the shared cache).
    pub fn new(
        id: impl Into<String>,
        source: WmsSource,
        scheme: TilingScheme,
        zoom: u8,
        params: DecodeParams,
        loader: Arc<TileLoader>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            scheme,
            zoom,
            params,
            loader,
        }
    }

    /// The tiling scheme this layer requests tiles in.
    pub fn scheme(&self) -> TilingScheme {
        self.scheme
    }

    /// The zoom level tiles are requested at.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Cache key for one of this layer's tiles.
    pub fn key_for(&self, coord: TileCoord) -> TileKey {
        TileKey::new(self.id.clone(), coord)
    }

    /// GetMap URL for one of this layer's tiles.
    pub fn url_for(&self, coord: TileCoord) -> String {
        self.source.getmap_url(self.scheme, coord, self.params.tile_size)
    }

    /// Tile-visible hook: fetch the tile covering `coord` if it is not
    /// already cached or in flight.
    pub async fn request_tile(&self, coord: TileCoord) -> Result<LoadOutcome> {
        let key = self.key_for(coord);
        let url = self.url_for(coord);
        self.loader.load_tile(&url, coord, &key).await
    }

    /// Fetch the tile covering a geographic position at the layer's zoom.
    ///
    /// Returns the tile coordinate that was requested, or `None` when the
    /// position is outside the tiling scheme.
    pub async fn request_position(&self, lon: f64, lat: f64) -> Result<Option<TileCoord>> {
        match self.scheme.locate(lon, lat, self.zoom, self.params.tile_size) {
            Some(hit) => {
                self.request_tile(hit.coord).await?;
                Ok(Some(hit.coord))
            }
            None => Ok(None),
        }
    }
}

impl ElevationLayer for WmsElevationLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn covers(&self, lon: f64, lat: f64) -> bool {
        self.scheme
            .locate(lon, lat, self.zoom, self.params.tile_size)
            .is_some()
    }

    fn elevation_at(&self, lon: f64, lat: f64) -> Elevation {
        match self.scheme.locate(lon, lat, self.zoom, self.params.tile_size) {
            Some(hit) => sample_elevation(
                self.loader.cache(),
                &self.key_for(hit.coord),
                hit.pixel,
                self.params,
            ),
            None => Elevation::NoData,
        }
    }
}

/// Registry of the elevation layers active on a map, keyed by layer id.
///
/// Attach/detach mirror layer add/remove on the map. Attaching a layer with
/// an id that is already present replaces it. Detaching does not cancel
/// in-flight fetches; their results land in the cache and simply stop being
/// queried.
#[derive(Default)]
pub struct ElevationRegistry {
    layers: RwLock<Vec<Arc<dyn ElevationLayer>>>,
}

impl ElevationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer, replacing any layer with the same id.
    pub fn attach(&self, layer: Arc<dyn ElevationLayer>) {
        let mut layers = self.write();
        layers.retain(|l| l.id() != layer.id());
        layers.push(layer);
    }

    /// Remove a layer by id. Returns whether a layer was removed.
    pub fn detach(&self, id: &str) -> bool {
        let mut layers = self.write();
        let before = layers.len();
        layers.retain(|l| l.id() != id);
        layers.len() != before
    }

    /// Look up a layer by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn ElevationLayer>> {
        self.read().iter().find(|l| l.id() == id).cloned()
    }

    /// Ids of all attached layers, in attach order.
    pub fn ids(&self) -> Vec<String> {
        self.read().iter().map(|l| l.id().to_string()).collect()
    }

    /// Number of attached layers.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no layers are attached.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sample one layer at a position.
    pub fn elevation_at(&self, id: &str, lon: f64, lat: f64) -> Result<Elevation> {
        self.get(id)
            .map(|layer| layer.elevation_at(lon, lat))
            .ok_or_else(|| TileError::UnknownLayer(id.to_string()))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn ElevationLayer>>> {
        self.layers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn ElevationLayer>>> {
        self.layers.write().unwrap_or_else(|e| e.into_inner())
    }
}
