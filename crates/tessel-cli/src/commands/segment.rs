use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tessel_core::config::{ColorSpace, SegmentationConfig};
use tessel_core::segmenter::Segmenter;

#[derive(Args)]
pub struct SegmentArgs {
    /// Input image
    pub image: PathBuf,

    /// TOML configuration file; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Label map output file
    #[arg(short, long, default_value = "labels.txt")]
    pub output: PathBuf,

    /// Write the mean-color reconstruction to this image file
    #[arg(long)]
    pub mean_map: Option<PathBuf>,

    /// Block width (pixels) at the finest level
    #[arg(long)]
    pub block_width: Option<usize>,

    /// Block height (pixels) at the finest level
    #[arg(long)]
    pub block_height: Option<usize>,

    /// Number of hierarchy levels
    #[arg(long)]
    pub levels: Option<usize>,

    /// Histogram bins per color channel
    #[arg(long)]
    pub bins: Option<usize>,

    /// Color space: hsv or lab
    #[arg(long)]
    pub color_space: Option<String>,

    /// Disable the mean-color pixel criterion
    #[arg(long)]
    pub no_means: bool,

    /// Disable the spatial smoothing prior
    #[arg(long)]
    pub no_prior: bool,

    /// Run each block level twice (confidence-gated, then ungated)
    #[arg(long)]
    pub double_steps: bool,

    /// Intersection margin for the confidence-gated block pass
    #[arg(long)]
    pub confidence: Option<f32>,
}

pub fn run(args: &SegmentArgs) -> Result<()> {
    let config = build_config(args)?;

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?
        .to_rgb8();
    let (width, height) = image.dimensions();

    let mut segmenter = Segmenter::new(width as usize, height as usize, config)?;
    segmenter.load_image(&image)?;
    segmenter.iterate()?;

    println!("Image:       {}x{}", width, height);
    println!("Superpixels: {}", segmenter.count_superpixels()?);

    segmenter
        .label_map()?
        .write_text(&args.output)
        .with_context(|| format!("Failed to write labels to {}", args.output.display()))?;
    println!("Labels saved to {}", args.output.display());

    if let Some(ref path) = args.mean_map {
        segmenter
            .mean_map()?
            .save(path)
            .with_context(|| format!("Failed to write mean map to {}", path.display()))?;
        println!("Mean map saved to {}", path.display());
    }

    Ok(())
}

pub fn build_config(args: &SegmentArgs) -> Result<SegmentationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => SegmentationConfig::default(),
    };

    if let Some(v) = args.block_width {
        config.block_width = v;
    }
    if let Some(v) = args.block_height {
        config.block_height = v;
    }
    if let Some(v) = args.levels {
        config.levels = v;
    }
    if let Some(v) = args.bins {
        config.bins_per_channel = v;
    }
    if let Some(ref name) = args.color_space {
        config.color_space = match name.to_lowercase().as_str() {
            "hsv" => ColorSpace::Hsv,
            "lab" => ColorSpace::Lab,
            other => bail!("Unknown color space: {}", other),
        };
    }
    if args.no_means {
        config.use_means = false;
    }
    if args.no_prior {
        config.spatial_prior = false;
    }
    if args.double_steps {
        config.double_steps = true;
    }
    if let Some(v) = args.confidence {
        config.required_confidence = v;
    }

    Ok(config)
}
