use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BINS_PER_CHANNEL, DEFAULT_BLOCK_HEIGHT, DEFAULT_BLOCK_WIDTH, DEFAULT_LEVELS,
    DEFAULT_REQUIRED_CONFIDENCE,
};

/// Color quantization strategy for the joint histogram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Hue/saturation/value with fixed equal-width bins. Faster to set up.
    #[default]
    Hsv,
    /// CIE-Lab-like transform with per-image adaptive quantile bins.
    Lab,
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hsv => write!(f, "HSV"),
            Self::Lab => write!(f, "Lab"),
        }
    }
}

/// Parameters for one segmentation run.
///
/// The nominal superpixel count for a `width`x`height` image is
/// `(width / block_width >> (levels - 1)) * (height / block_height >> (levels - 1))`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Block width (pixels) at the finest level.
    pub block_width: usize,
    /// Block height (pixels) at the finest level.
    pub block_height: usize,
    /// Number of hierarchy levels; the top level holds the superpixels.
    pub levels: usize,
    /// Histogram bins per channel; the joint histogram has `bins^3` entries.
    pub bins_per_channel: usize,
    /// Quantization strategy.
    pub color_space: ColorSpace,
    /// Pixel phase compares mean colors and keeps per-superpixel channel sums.
    pub use_means: bool,
    /// Weight pixel decisions by the local same-label neighbor count.
    pub spatial_prior: bool,
    /// Optimize each block level twice: confidence-gated, then ungated.
    pub double_steps: bool,
    /// Intersection margin required by the gated block pass.
    pub required_confidence: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            block_width: DEFAULT_BLOCK_WIDTH,
            block_height: DEFAULT_BLOCK_HEIGHT,
            levels: DEFAULT_LEVELS,
            bins_per_channel: DEFAULT_BINS_PER_CHANNEL,
            color_space: ColorSpace::default(),
            use_means: true,
            spatial_prior: true,
            double_steps: false,
            required_confidence: DEFAULT_REQUIRED_CONFIDENCE,
        }
    }
}

impl SegmentationConfig {
    /// Joint histogram size.
    pub fn histogram_size(&self) -> usize {
        self.bins_per_channel * self.bins_per_channel * self.bins_per_channel
    }
}
