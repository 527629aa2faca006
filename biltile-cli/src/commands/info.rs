use anyhow::{bail, Context, Result};
use std::path::Path;

use biltile::sampler::DecodeParams;

pub fn run(file: &Path, params: DecodeParams) -> Result<()> {
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if data.is_empty() {
        bail!("Empty file: {}", file.display());
    }
    if data.len() % 2 != 0 {
        bail!(
            "Odd byte count ({}): not a 16-bit raster",
            data.len()
        );
    }

    let sample_count = data.len() / 2;

    // Min/max/mean over valid samples; sentinels and the reserved short
    // values count as voids.
    let (mut min_elev, mut max_elev) = (i16::MAX, i16::MIN);
    let mut sum: i64 = 0;
    let mut valid_count = 0u64;
    let mut void_count = 0u64;

    for pair in data.chunks_exact(2) {
        let raw = [pair[0], pair[1]];
        let value = if params.little_endian {
            i16::from_le_bytes(raw)
        } else {
            i16::from_be_bytes(raw)
        };

        if value == params.no_data || value == i16::MAX || value == i16::MIN {
            void_count += 1;
        } else {
            min_elev = min_elev.min(value);
            max_elev = max_elev.max(value);
            sum += value as i64;
            valid_count += 1;
        }
    }

    println!("File: {}", file.display());
    println!("File size: {}", format_size(data.len() as u64));
    println!();
    print!("Samples: {}", sample_count);
    let side = (sample_count as f64).sqrt() as usize;
    if side * side == sample_count {
        print!(" ({}x{} grid)", side, side);
    }
    println!();
    println!(
        "Byte order: {}",
        if params.little_endian {
            "little-endian"
        } else {
            "big-endian"
        }
    );
    println!("No-data sentinel: {}", params.no_data);
    println!();

    if valid_count > 0 {
        println!("Min elevation: {}m", min_elev);
        println!("Max elevation: {}m", max_elev);
        println!("Mean elevation: {:.1}m", sum as f64 / valid_count as f64);
    }

    if void_count > 0 {
        let void_pct = (void_count as f64 / sample_count as f64) * 100.0;
        println!("Void samples: {} ({:.1}%)", void_count, void_pct);
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
