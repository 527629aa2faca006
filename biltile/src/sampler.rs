//! Elevation sampling over cached tiles.
//!
//! Sampling is synchronous and performs no I/O: it looks a key up in the
//! cache and decodes one pixel. Unavailability is always reported through
//! the structured [`Elevation`] result, never as an error — the message
//! vocabulary (`elevationNotAvailable`, `elevationLoading`,
//! `elevationLoadingError`) matches what map UIs display.

use crate::cache::{TileCache, TileState};
use crate::decode::{decode_sample, DEFAULT_NO_DATA};
use crate::key::TileKey;

/// Default tile width/height in samples.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// Pixel position within a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPosition {
    /// Column within the tile (0 = west edge).
    pub x: usize,
    /// Row within the tile (0 = north edge).
    pub y: usize,
}

impl PixelPosition {
    /// Create a new pixel position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Decode parameters for sampling a BIL16 tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    /// Tile width in samples (rows are this many samples wide).
    pub tile_size: usize,
    /// No-data sentinel value.
    pub no_data: i16,
    /// Whether samples are little-endian. BIL tiles from WMS servers are
    /// conventionally big-endian.
    pub little_endian: bool,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            no_data: DEFAULT_NO_DATA,
            little_endian: false,
        }
    }
}

/// Result of an elevation sample.
///
/// `Value` and `NoData` are both "available" outcomes: the tile is present
/// and was decoded. `NoData` means this exact pixel holds a sentinel (or is
/// outside the tile's bounds) — callers must treat it distinctly from the
/// tile-unavailable variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// A decoded elevation value in meters.
    Value(i16),
    /// Tile present, but no elevation recorded at this pixel.
    NoData,
    /// The tile has never been requested, or was evicted.
    NotLoaded,
    /// A load for the tile has been announced but has not settled.
    Loading,
    /// The tile's load failed.
    Failed,
}

impl Elevation {
    /// Whether a tile was present and decoded (`Value` or `NoData`).
    pub fn is_available(&self) -> bool {
        matches!(self, Elevation::Value(_) | Elevation::NoData)
    }

    /// The decoded value, if any.
    pub fn value(&self) -> Option<i16> {
        match self {
            Elevation::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// UI message key for unavailable samples, `None` when available.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Elevation::Value(_) | Elevation::NoData => None,
            Elevation::NotLoaded => Some("elevationNotAvailable"),
            Elevation::Loading => Some("elevationLoading"),
            Elevation::Failed => Some("elevationLoadingError"),
        }
    }
}

/// Sample the elevation at a pixel of a cached tile.
///
/// Looks `key` up in `cache` (refreshing its recency) and decodes the pixel
/// per the BIL16 rules. Never panics and never performs I/O.
///
/// # Example
///
/// ```
/// use biltile::cache::{TileCache, TileEntry};
/// use biltile::key::{TileCoord, TileKey};
/// use biltile::sampler::{sample_elevation, DecodeParams, Elevation, PixelPosition};
/// use bytes::Bytes;
///
/// let cache = TileCache::default();
/// let key = TileKey::new("dem", TileCoord::new(0, 0, 1));
/// let params = DecodeParams { tile_size: 1, ..Default::default() };
///
/// cache.insert(key.clone(), TileEntry::ready(key.coord, Bytes::from_static(&[0x03, 0xE8])));
/// assert_eq!(sample_elevation(&cache, &key, PixelPosition::new(0, 0), params), Elevation::Value(1000));
/// ```
pub fn sample_elevation(
    cache: &TileCache,
    key: &TileKey,
    pixel: PixelPosition,
    params: DecodeParams,
) -> Elevation {
    let entry = match cache.get(key) {
        Some(entry) => entry,
        None => return Elevation::NotLoaded,
    };

    match entry.state {
        TileState::Loading => Elevation::Loading,
        TileState::Failed(_) => Elevation::Failed,
        TileState::Ready(data) => {
            match decode_sample(
                &data,
                params.tile_size,
                pixel.x,
                pixel.y,
                params.no_data,
                params.little_endian,
            ) {
                Some(value) => Elevation::Value(value),
                None => Elevation::NoData,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TileEntry;
    use crate::key::TileCoord;
    use bytes::Bytes;

    fn key() -> TileKey {
        TileKey::new("dem", TileCoord::new(3, 4, 5))
    }

    /// A 4x4 big-endian tile where sample (x, y) holds 100*y + x.
    fn tile_4x4() -> Bytes {
        let mut data = Vec::new();
        for y in 0i16..4 {
            for x in 0i16..4 {
                data.extend_from_slice(&(100 * y + x).to_be_bytes());
            }
        }
        Bytes::from(data)
    }

    fn params_4() -> DecodeParams {
        DecodeParams {
            tile_size: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_tile_is_not_available() {
        let cache = TileCache::default();
        let sample = sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4());
        assert_eq!(sample, Elevation::NotLoaded);
        assert!(!sample.is_available());
        assert_eq!(sample.message(), Some("elevationNotAvailable"));
    }

    #[test]
    fn test_ready_tile_samples_pixels() {
        let cache = TileCache::default();
        cache.insert(key(), TileEntry::ready(key().coord, tile_4x4()));

        assert_eq!(
            sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4()),
            Elevation::Value(0)
        );
        assert_eq!(
            sample_elevation(&cache, &key(), PixelPosition::new(2, 3), params_4()),
            Elevation::Value(302)
        );
        assert!(sample_elevation(&cache, &key(), PixelPosition::new(2, 3), params_4()).is_available());
    }

    #[test]
    fn test_out_of_bounds_pixel_is_no_data() {
        let cache = TileCache::default();
        cache.insert(key(), TileEntry::ready(key().coord, tile_4x4()));

        let sample = sample_elevation(&cache, &key(), PixelPosition::new(0, 4), params_4());
        assert_eq!(sample, Elevation::NoData);
        // Still an "available" outcome, just with no value at this pixel
        assert!(sample.is_available());
        assert_eq!(sample.value(), None);
        assert_eq!(sample.message(), None);
    }

    #[test]
    fn test_sentinel_pixel_is_no_data() {
        let cache = TileCache::default();
        let mut data = tile_4x4().to_vec();
        data[0..2].copy_from_slice(&DEFAULT_NO_DATA.to_be_bytes());
        cache.insert(key(), TileEntry::ready(key().coord, Bytes::from(data)));

        assert_eq!(
            sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4()),
            Elevation::NoData
        );
    }

    #[test]
    fn test_failed_tile_reports_loading_error() {
        let cache = TileCache::default();
        cache.insert(key(), TileEntry::failed(key().coord, "HTTP 500"));

        let sample = sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4());
        assert_eq!(sample, Elevation::Failed);
        assert_eq!(sample.message(), Some("elevationLoadingError"));
    }

    #[test]
    fn test_loading_tile_reports_loading() {
        let cache = TileCache::default();
        cache.insert(
            key(),
            TileEntry {
                coord: key().coord,
                state: TileState::Loading,
            },
        );

        let sample = sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4());
        assert_eq!(sample, Elevation::Loading);
        assert_eq!(sample.message(), Some("elevationLoading"));
    }

    #[test]
    fn test_reset_makes_all_keys_unavailable() {
        let cache = TileCache::default();
        cache.insert(key(), TileEntry::ready(key().coord, tile_4x4()));
        cache.insert(
            TileKey::new("other", TileCoord::new(0, 0, 1)),
            TileEntry::failed(TileCoord::new(0, 0, 1), "boom"),
        );

        cache.reset(None);

        assert_eq!(
            sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params_4()),
            Elevation::NotLoaded
        );
        assert_eq!(
            sample_elevation(
                &cache,
                &TileKey::new("other", TileCoord::new(0, 0, 1)),
                PixelPosition::new(0, 0),
                params_4()
            ),
            Elevation::NotLoaded
        );
    }

    #[test]
    fn test_little_endian_params() {
        let cache = TileCache::default();
        cache.insert(
            key(),
            TileEntry::ready(key().coord, Bytes::from_static(&[0x61, 0x61])),
        );
        let params = DecodeParams {
            tile_size: 256,
            little_endian: true,
            ..Default::default()
        };

        assert_eq!(
            sample_elevation(&cache, &key(), PixelPosition::new(0, 0), params),
            Elevation::Value(24929)
        );
    }
}
