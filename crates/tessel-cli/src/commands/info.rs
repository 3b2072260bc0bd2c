use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tessel_core::config::SegmentationConfig;
use tessel_core::hierarchy::level_grids;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image
    pub image: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Report the hierarchy geometry a config would produce for an image,
/// without running the segmentation.
pub fn run(args: &InfoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => SegmentationConfig::default(),
    };

    let (width, height) = image::image_dimensions(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?;
    let grids = level_grids(width as usize, height as usize, &config)?;

    println!("Image:       {}x{}", width, height);
    println!("Block size:  {}x{}", config.block_width, config.block_height);
    println!("Color space: {}", config.color_space);
    println!("Histogram:   {} bins", config.histogram_size());
    for (level, (nr_w, nr_h)) in grids.iter().enumerate() {
        println!("Level {}:     {}x{} blocks", level, nr_w, nr_h);
    }
    let (top_w, top_h) = grids[grids.len() - 1];
    println!("Superpixels: {}", top_w * top_h);

    Ok(())
}
