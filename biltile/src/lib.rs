//! # biltile — BIL16 elevation tiles for web maps
//!
//! Engine-agnostic elevation support for interactive web-mapping clients:
//! fetch raw BIL16 tiles from a WMS server, keep them in a bounded LRU
//! cache, and sample per-pixel elevation values for mouse-position readouts.
//!
//! ## Features
//!
//! - **Bounded**: strict LRU tile cache, 100 tiles by default
//! - **At-most-once**: each tile key is fetched a single time, success or
//!   failure; concurrent requests for the same key collapse into one fetch
//! - **Non-throwing sampling**: unavailable elevations come back as
//!   structured results, never errors or panics
//! - **Two tile grids**: geographic (EPSG:4326) and web-mercator (EPSG:3857)
//!
//! ## Quick Start
//!
//! ```ignore
//! use biltile::{Elevation, LayerConfig};
//!
//! let config = LayerConfig::new("https://example.com/geoserver/wms", "topp:dem");
//! let (_cache, _loader, layer) = config.build()?;
//!
//! // Engine tile-visible hook: fetch the tile covering a position
//! layer.request_position(12.5, 41.9).await?;
//!
//! // Mouse-position readout: synchronous, cache-only
//! match layer.elevation_at(12.5, 41.9) {
//!     Elevation::Value(meters) => println!("{} m", meters),
//!     other => println!("{}", other.message().unwrap_or("")),
//! }
//! ```
//!
//! ## BIL16 Format
//!
//! Tiles are raw row-major grids of signed 16-bit integers (two bytes per
//! sample), requested from WMS as `FORMAT=application/bil16`. The default
//! no-data sentinel is `-9999`; the reserved short values `32767` and
//! `-32768` are always treated as invalid.

pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod key;
pub mod layer;
pub mod loader;
pub mod sampler;
pub mod scheme;
pub mod wms;

// Re-export main types at crate root for convenience
pub use cache::{CacheStats, TileCache, TileEntry, TileState, DEFAULT_CAPACITY};
pub use config::LayerConfig;
pub use decode::{decode_sample, DEFAULT_NO_DATA};
pub use error::{Result, TileError};
pub use key::{TileCoord, TileKey};
pub use layer::{ElevationLayer, ElevationRegistry, WmsElevationLayer};
pub use loader::{LoadOutcome, TileFetcher, TileLoader};
pub use sampler::{sample_elevation, DecodeParams, Elevation, PixelPosition};
pub use scheme::{TileBounds, TilePixel, TilingScheme};
pub use wms::WmsSource;
