#![allow(dead_code)]

use image::{Rgb, RgbImage};
use tessel_core::config::SegmentationConfig;
use tessel_core::hierarchy::LabelHierarchy;
use tessel_core::quantize::{quantize_image, QuantizedImage, Quantizer};
use tessel_core::stats::LabelStatistics;

pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Left half `left`, right half `right`, seam at width/2.
pub fn split_image(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb(left)
        } else {
            Rgb(right)
        }
    })
}

/// Deterministic pseudo-random image (LCG), for determinism and
/// conservation checks.
pub fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut state = seed;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u8
    };
    let mut image = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            image.put_pixel(x, y, Rgb([next(), next(), next()]));
        }
    }
    image
}

pub fn config(block_width: usize, block_height: usize, levels: usize) -> SegmentationConfig {
    SegmentationConfig {
        block_width,
        block_height,
        levels,
        ..SegmentationConfig::default()
    }
}

/// Hierarchy + rebuilt statistics for an image, ready for optimizer calls.
pub fn setup(
    image: &RgbImage,
    config: &SegmentationConfig,
) -> (LabelHierarchy, LabelStatistics, QuantizedImage) {
    let hierarchy =
        LabelHierarchy::new(image.width() as usize, image.height() as usize, config).unwrap();
    let quantizer = Quantizer::new(config.color_space, config.bins_per_channel, image);
    let quantized = quantize_image(image, &quantizer);
    let mut stats = LabelStatistics::new(&hierarchy, quantizer.bin_count());
    stats.rebuild(&hierarchy, &quantized);
    (hierarchy, stats, quantized)
}
