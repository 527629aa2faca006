use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use biltile::config::parse_crs;
use biltile::sampler::DecodeParams;
use biltile::LayerConfig;

mod commands;

/// WMS BIL16 elevation tile CLI tool
#[derive(Parser)]
#[command(name = "biltile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// WMS endpoint serving BIL16 tiles
    #[arg(long, env = "BILTILE_WMS_URL", global = true)]
    wms_url: Option<String>,

    /// WMS layer name
    #[arg(long, env = "BILTILE_WMS_LAYER", global = true)]
    wms_layer: Option<String>,

    /// Layer id used for cache keys (defaults to the WMS layer name)
    #[arg(long, env = "BILTILE_LAYER_ID", global = true)]
    layer_id: Option<String>,

    /// CRS of the tile grid (EPSG:4326 or EPSG:3857)
    #[arg(long, env = "BILTILE_CRS", default_value = "EPSG:4326", global = true)]
    crs: String,

    /// Zoom level tiles are requested at
    #[arg(short, long, env = "BILTILE_ZOOM", default_value = "7", global = true)]
    zoom: u8,

    /// Tile width/height in samples
    #[arg(long, env = "BILTILE_TILE_SIZE", default_value = "256", global = true)]
    tile_size: usize,

    /// No-data sentinel value
    #[arg(long, env = "BILTILE_NO_DATA", default_value = "-9999", global = true)]
    no_data: i16,

    /// Treat samples as little-endian
    #[arg(long, env = "BILTILE_LITTLE_ENDIAN", global = true)]
    little_endian: bool,

    /// Maximum tiles in cache
    #[arg(long, env = "BILTILE_CACHE_SIZE", default_value = "100", global = true)]
    cache_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation at a geographic position
    Query {
        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Fetch one tile and report the load outcome
    Fetch {
        /// Tile column
        #[arg(short, long)]
        x: u32,

        /// Tile row
        #[arg(short, long)]
        y: u32,

        /// Zoom level (overrides --zoom)
        #[arg(long)]
        z: Option<u8>,
    },

    /// Display information about a local BIL16 file
    Info {
        /// Path to the raw BIL16 file
        file: PathBuf,
    },
}

impl Cli {
    fn decode_params(&self) -> DecodeParams {
        DecodeParams {
            tile_size: self.tile_size,
            no_data: self.no_data,
            little_endian: self.little_endian,
        }
    }

    /// Assemble the layer configuration from flags and environment.
    fn layer_config(&self) -> Result<LayerConfig> {
        let wms_url = self.wms_url.clone().context(
            "WMS endpoint not set. Use --wms-url or set BILTILE_WMS_URL",
        )?;
        let wms_layer = self.wms_layer.clone().context(
            "WMS layer not set. Use --wms-layer or set BILTILE_WMS_LAYER",
        )?;

        let mut config = LayerConfig::new(wms_url, wms_layer)
            .scheme(parse_crs(&self.crs)?)
            .zoom(self.zoom)
            .params(self.decode_params())
            .cache_capacity(self.cache_size);
        if let Some(id) = &self.layer_id {
            config = config.layer_id(id.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Query { lon, lat, json } => {
            commands::query::run(cli.layer_config()?, *lon, *lat, *json).await
        }
        Commands::Fetch { x, y, z } => {
            let zoom = z.unwrap_or(cli.zoom);
            commands::fetch::run(cli.layer_config()?, *x, *y, zoom).await
        }
        Commands::Info { file } => commands::info::run(file, cli.decode_params()),
    }
}
