//! Tile grid arithmetic for the map-engine coordinate systems.
//!
//! Elevation layers in the supported engines tile the world in one of two
//! grids: a geographic (EPSG:4326) scheme with two root tiles, or the square
//! web-mercator (EPSG:3857) pyramid. The scheme translates a geographic
//! position into the generic (tile coordinate, in-tile pixel) vocabulary the
//! sampler consumes, and produces the native-CRS bounding box of a tile for
//! WMS requests.

use crate::key::TileCoord;
use crate::sampler::PixelPosition;

/// Web-mercator latitude limit in degrees.
const MERCATOR_MAX_LAT: f64 = 85.05112878;

/// Half the web-mercator world extent in meters (WGS84 ellipsoid).
const MERCATOR_HALF_WORLD: f64 = 20_037_508.342789244;

/// A tile coordinate paired with a pixel position inside that tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePixel {
    /// The tile containing the position.
    pub coord: TileCoord,
    /// The position within the tile's sample grid.
    pub pixel: PixelPosition,
}

/// Bounding box of a tile in the scheme's native CRS units
/// (degrees for EPSG:4326, meters for EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Tile grid used by an elevation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingScheme {
    /// Plate carrée grid: 2·2^z columns by 2^z rows of square-degree tiles.
    Geographic,
    /// Web-mercator pyramid: 2^z by 2^z tiles.
    WebMercator,
}

impl TilingScheme {
    /// Grid dimensions (columns, rows) at a zoom level.
    pub fn tiles_at(&self, zoom: u8) -> (u32, u32) {
        let n = 1u32 << zoom.min(31);
        match self {
            TilingScheme::Geographic => (n.saturating_mul(2), n),
            TilingScheme::WebMercator => (n, n),
        }
    }

    /// CRS identifier for WMS requests against this scheme.
    pub fn crs(&self) -> &'static str {
        match self {
            TilingScheme::Geographic => "EPSG:4326",
            TilingScheme::WebMercator => "EPSG:3857",
        }
    }

    /// Whether WMS 1.3.0 bounding boxes for this CRS are latitude-first.
    pub fn axis_is_lat_first(&self) -> bool {
        matches!(self, TilingScheme::Geographic)
    }

    /// Map a geographic position to its tile and in-tile pixel.
    ///
    /// `tile_size` is the tile width/height in samples. Returns `None` for
    /// positions outside the scheme's domain (beyond ±90° latitude, or
    /// beyond the web-mercator latitude limit).
    pub fn locate(&self, lon: f64, lat: f64, zoom: u8, tile_size: usize) -> Option<TilePixel> {
        if !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        let (cols, rows) = self.tiles_at(zoom);
        let (fx, fy) = match self {
            TilingScheme::Geographic => {
                if !(-90.0..=90.0).contains(&lat) {
                    return None;
                }
                (
                    (lon + 180.0) / 360.0 * cols as f64,
                    (90.0 - lat) / 180.0 * rows as f64,
                )
            }
            TilingScheme::WebMercator => {
                if !(-MERCATOR_MAX_LAT..=MERCATOR_MAX_LAT).contains(&lat) {
                    return None;
                }
                let lat_rad = lat.to_radians();
                let merc_y = lat_rad.tan().asinh();
                (
                    (lon + 180.0) / 360.0 * cols as f64,
                    (1.0 - merc_y / std::f64::consts::PI) / 2.0 * rows as f64,
                )
            }
        };

        // Positions on the east/south world edge fold into the last tile
        let x = (fx.floor() as i64).clamp(0, cols as i64 - 1) as u32;
        let y = (fy.floor() as i64).clamp(0, rows as i64 - 1) as u32;

        let px = ((fx - x as f64) * tile_size as f64) as i64;
        let py = ((fy - y as f64) * tile_size as f64) as i64;
        let last = tile_size.saturating_sub(1) as i64;

        Some(TilePixel {
            coord: TileCoord::new(x, y, zoom),
            pixel: PixelPosition::new(px.clamp(0, last) as usize, py.clamp(0, last) as usize),
        })
    }

    /// Native-CRS bounding box of a tile.
    pub fn tile_bounds(&self, coord: TileCoord) -> TileBounds {
        let (cols, rows) = self.tiles_at(coord.z);
        match self {
            TilingScheme::Geographic => {
                let width = 360.0 / cols as f64;
                let height = 180.0 / rows as f64;
                let west = -180.0 + coord.x as f64 * width;
                let north = 90.0 - coord.y as f64 * height;
                TileBounds {
                    west,
                    south: north - height,
                    east: west + width,
                    north,
                }
            }
            TilingScheme::WebMercator => {
                let size = 2.0 * MERCATOR_HALF_WORLD / cols as f64;
                let west = -MERCATOR_HALF_WORLD + coord.x as f64 * size;
                let north = MERCATOR_HALF_WORLD - coord.y as f64 * size;
                TileBounds {
                    west,
                    south: north - size,
                    east: west + size,
                    north,
                }
            }
        }
    }
}
