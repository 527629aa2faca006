use anyhow::{bail, Context, Result};
use serde::Serialize;

use biltile::layer::ElevationLayer;
use biltile::sampler::Elevation;
use biltile::LayerConfig;

#[derive(Serialize)]
struct ElevationOutput<'a> {
    layer: &'a str,
    lon: f64,
    lat: f64,
    elevation: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

pub async fn run(config: LayerConfig, lon: f64, lat: f64, json: bool) -> Result<()> {
    let (_cache, _loader, layer) = config
        .build()
        .context("Failed to build elevation layer")?;

    // Fetch the covering tile. A failed fetch is recorded in the cache and
    // surfaces through the sample below as elevationLoadingError.
    match layer.request_position(lon, lat).await {
        Ok(Some(_)) | Err(_) => {}
        Ok(None) => bail!(
            "position outside the tiling scheme: lon={}, lat={}",
            lon,
            lat
        ),
    }

    let sample = layer.elevation_at(lon, lat);

    if json {
        let output = ElevationOutput {
            layer: layer.id(),
            lon,
            lat,
            elevation: sample.value(),
            message: sample.message(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        match sample {
            Elevation::Value(meters) => println!("{}", meters),
            Elevation::NoData => println!("no data"),
            other => println!("{}", other.message().unwrap_or("elevationNotAvailable")),
        }
    }

    Ok(())
}
