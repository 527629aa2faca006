//! Tile coordinates and cache keys.
//!
//! A cache key combines the layer id with the tile's (column, row, zoom)
//! so that two layers requesting the same tile coordinates never collide.

use std::fmt;

/// Engine tile coordinates: column, row, and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Tile column (x).
    pub x: u32,
    /// Tile row (y).
    pub y: u32,
    /// Zoom level.
    pub z: u8,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Cache key for an elevation tile: layer id plus tile coordinates.
///
/// The key is collision-free by construction — the layer id is a separate
/// field, not concatenated into a shared string namespace.
///
/// # Example
///
/// ```
/// use biltile::key::{TileCoord, TileKey};
///
/// let key = TileKey::new("dem", TileCoord::new(12, 42, 7));
/// assert_eq!(key.to_string(), "dem/7/12/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Id of the elevation layer this tile belongs to.
    pub layer: String,
    /// Tile coordinates.
    pub coord: TileCoord,
}

impl TileKey {
    /// Create a new tile key.
    pub fn new(layer: impl Into<String>, coord: TileCoord) -> Self {
        Self {
            layer: layer.into(),
            coord,
        }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.coord)
    }
}
