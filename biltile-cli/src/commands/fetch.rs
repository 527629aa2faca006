use anyhow::{bail, Context, Result};

use biltile::key::TileCoord;
use biltile::loader::LoadOutcome;
use biltile::LayerConfig;

pub async fn run(config: LayerConfig, x: u32, y: u32, zoom: u8) -> Result<()> {
    let scheme = config.scheme;
    let (cols, rows) = scheme.tiles_at(zoom);
    if x >= cols || y >= rows {
        bail!(
            "tile ({}, {}) outside the {}x{} grid at zoom {}",
            x,
            y,
            cols,
            rows,
            zoom
        );
    }

    let (cache, _loader, layer) = config
        .build()
        .context("Failed to build elevation layer")?;

    let coord = TileCoord::new(x, y, zoom);
    println!("URL: {}", layer.url_for(coord));

    let outcome = layer
        .request_tile(coord)
        .await
        .with_context(|| format!("Failed to fetch tile {}", coord))?;

    match outcome {
        LoadOutcome::Fetched => println!("Fetched {}", coord),
        LoadOutcome::AlreadyCached => println!("Already cached: {}", coord),
        LoadOutcome::InFlight => println!("Fetch already in flight: {}", coord),
    }

    let stats = cache.stats();
    println!();
    println!("Cached tiles: {}/{}", stats.entry_count, stats.capacity);
    println!("Cache hits: {}", stats.hit_count);
    println!("Cache misses: {}", stats.miss_count);

    Ok(())
}
