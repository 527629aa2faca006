//! WMS GetMap request construction for BIL16 elevation tiles.
//!
//! Elevation tiles are plain WMS `GetMap` responses requested with
//! `FORMAT=application/bil16`. The builder honors the WMS 1.3.0 axis-order
//! rule: EPSG:4326 bounding boxes are latitude-first, EPSG:3857 stays
//! easting-first.

use crate::key::TileCoord;
use crate::scheme::TilingScheme;

/// Default MIME type requested for elevation tiles.
pub const DEFAULT_FORMAT: &str = "application/bil16";

/// WMS protocol version used for requests.
const WMS_VERSION: &str = "1.3.0";

/// Description of a WMS endpoint serving BIL16 elevation tiles.
///
/// # Example
///
/// ```
/// use biltile::key::TileCoord;
/// use biltile::scheme::TilingScheme;
/// use biltile::wms::WmsSource;
///
/// let source = WmsSource::new("https://example.com/geoserver/wms", "topp:dem");
/// let url = source.getmap_url(TilingScheme::Geographic, TileCoord::new(0, 0, 0), 256);
/// assert!(url.contains("FORMAT=application%2Fbil16"));
/// ```
#[derive(Debug, Clone)]
pub struct WmsSource {
    base_url: String,
    layer_name: String,
    format: String,
    style: String,
}

impl WmsSource {
    /// Create a source for `layer_name` at `base_url` with the default
    /// BIL16 format and empty style.
    pub fn new(base_url: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            layer_name: layer_name.into(),
            format: DEFAULT_FORMAT.to_string(),
            style: String::new(),
        }
    }

    /// Override the requested format (e.g. a vendor-specific BIL MIME type).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the WMS style name.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// The WMS endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The WMS layer name.
    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    /// Build the `GetMap` URL for one tile.
    ///
    /// The bounding box comes from the tiling scheme in its native CRS;
    /// `tile_size` sets both WIDTH and HEIGHT.
    pub fn getmap_url(&self, scheme: TilingScheme, coord: TileCoord, tile_size: usize) -> String {
        let bounds = scheme.tile_bounds(coord);

        // WMS 1.3.0: EPSG:4326 declares latitude as its first axis
        let bbox = if scheme.axis_is_lat_first() {
            format!("{},{},{},{}", bounds.south, bounds.west, bounds.north, bounds.east)
        } else {
            format!("{},{},{},{}", bounds.west, bounds.south, bounds.east, bounds.north)
        };

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}SERVICE=WMS&VERSION={}&REQUEST=GetMap&LAYERS={}&STYLES={}&FORMAT={}&CRS={}&BBOX={}&WIDTH={}&HEIGHT={}",
            self.base_url,
            separator,
            WMS_VERSION,
            encode_query_value(&self.layer_name),
            encode_query_value(&self.style),
            encode_query_value(&self.format),
            scheme.crs(),
            bbox,
            tile_size,
            tile_size,
        )
    }
}

/// Percent-encode the characters that matter inside a query value.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' | b',' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getmap_url_geographic() {
        let source = WmsSource::new("https://example.com/wms", "topp:dem");
        let url = source.getmap_url(TilingScheme::Geographic, TileCoord::new(0, 0, 0), 256);

        assert!(url.starts_with("https://example.com/wms?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap"));
        assert!(url.contains("LAYERS=topp:dem"));
        assert!(url.contains("FORMAT=application%2Fbil16"));
        assert!(url.contains("CRS=EPSG:4326"));
        // Lat-first axis order: south, west, north, east
        assert!(url.contains("BBOX=-90,-180,90,0"));
        assert!(url.contains("WIDTH=256&HEIGHT=256"));
    }

    #[test]
    fn test_getmap_url_mercator_axis_order() {
        let source = WmsSource::new("https://example.com/wms", "dem");
        let url = source.getmap_url(TilingScheme::WebMercator, TileCoord::new(0, 0, 0), 256);

        assert!(url.contains("CRS=EPSG:3857"));
        // Easting-first: west comes before south
        assert!(url.contains("BBOX=-20037508.342789244,-20037508.342789244"));
    }

    #[test]
    fn test_base_url_with_existing_query() {
        let source = WmsSource::new("https://example.com/wms?map=terrain", "dem");
        let url = source.getmap_url(TilingScheme::Geographic, TileCoord::new(1, 0, 0), 128);

        assert!(url.starts_with("https://example.com/wms?map=terrain&SERVICE=WMS"));
        assert!(url.contains("WIDTH=128&HEIGHT=128"));
    }

    #[test]
    fn test_custom_format_and_style() {
        let source = WmsSource::new("https://example.com/wms", "dem")
            .with_format("image/bil")
            .with_style("shaded relief");
        let url = source.getmap_url(TilingScheme::Geographic, TileCoord::new(0, 0, 1), 256);

        assert!(url.contains("FORMAT=image%2Fbil"));
        assert!(url.contains("STYLES=shaded%20relief"));
    }

    #[test]
    fn test_distinct_tiles_produce_distinct_urls() {
        let source = WmsSource::new("https://example.com/wms", "dem");
        let a = source.getmap_url(TilingScheme::WebMercator, TileCoord::new(1, 2, 3), 256);
        let b = source.getmap_url(TilingScheme::WebMercator, TileCoord::new(2, 1, 3), 256);
        assert_ne!(a, b);
    }
}
