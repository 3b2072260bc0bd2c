use image::{Rgb, RgbImage};
use ndarray::Array2;
use tracing::{debug, info};

use crate::config::SegmentationConfig;
use crate::consts::PIXEL_PASSES;
use crate::error::{Result, TesselError};
use crate::hierarchy::LabelHierarchy;
use crate::labelmap::LabelMap;
use crate::optimize;
use crate::quantize::{quantize_image, QuantizedImage, Quantizer};
use crate::stats::LabelStatistics;

#[derive(Debug)]
struct LoadedImage {
    quantizer: Quantizer,
    quantized: QuantizedImage,
}

/// Drives one segmentation: owns the hierarchy and statistics, loads an
/// image, runs the block descent and the pixel refinement, and exposes the
/// resulting superpixel grid.
///
/// The geometry is fixed at construction; `load_image` accepts any image of
/// those dimensions and resets all label state, so one segmenter can process
/// a sequence of equally sized frames.
#[derive(Debug)]
pub struct Segmenter {
    config: SegmentationConfig,
    hierarchy: LabelHierarchy,
    stats: LabelStatistics,
    loaded: Option<LoadedImage>,
    /// Next level for the block phase; `None` once the descent is exhausted.
    current_level: Option<usize>,
    forward: bool,
}

impl Segmenter {
    /// Validate `config` against the image geometry and allocate all label
    /// state. No image is loaded yet.
    pub fn new(width: usize, height: usize, config: SegmentationConfig) -> Result<Self> {
        let hierarchy = LabelHierarchy::new(width, height, &config)?;
        let stats = LabelStatistics::new(&hierarchy, config.histogram_size());
        Ok(Self {
            config,
            hierarchy,
            stats,
            loaded: None,
            current_level: None,
            forward: true,
        })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.hierarchy.width()
    }

    pub fn height(&self) -> usize {
        self.hierarchy.height()
    }

    /// Number of superpixels the hierarchy starts from (the top-level grid
    /// size); the observed count after refinement can be lower.
    pub fn nominal_superpixels(&self) -> usize {
        self.hierarchy.label_count(self.hierarchy.top_level())
    }

    /// Quantize `image` and reset all label state for a fresh run.
    pub fn load_image(&mut self, image: &RgbImage) -> Result<()> {
        let (got_width, got_height) = image.dimensions();
        let (got_width, got_height) = (got_width as usize, got_height as usize);
        if got_width != self.hierarchy.width() || got_height != self.hierarchy.height() {
            return Err(TesselError::ImageSizeMismatch {
                got_width,
                got_height,
                width: self.hierarchy.width(),
                height: self.hierarchy.height(),
            });
        }

        self.hierarchy.assign_labels();
        let quantizer = Quantizer::new(self.config.color_space, self.config.bins_per_channel, image);
        let quantized = quantize_image(image, &quantizer);
        self.stats.rebuild(&self.hierarchy, &quantized);
        self.loaded = Some(LoadedImage {
            quantizer,
            quantized,
        });
        self.current_level = self.hierarchy.top_level().checked_sub(1);
        self.forward = true;

        info!(
            width = got_width,
            height = got_height,
            color_space = %self.config.color_space,
            levels = self.hierarchy.levels(),
            superpixels = self.nominal_superpixels(),
            "image loaded"
        );
        Ok(())
    }

    /// Run the full optimization: block exchanges while descending the
    /// hierarchy, then the pixel refinement passes. Calling again on the
    /// same image only re-runs the pixel phase.
    pub fn iterate(&mut self) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(TesselError::NotInitialized)?;

        while let Some(level) = self.current_level {
            if self.config.double_steps {
                optimize::update_blocks(
                    &mut self.hierarchy,
                    &mut self.stats,
                    level,
                    self.config.required_confidence,
                );
            }
            optimize::update_blocks(&mut self.hierarchy, &mut self.stats, level, 0.0);
            debug!(level, "block pass done");
            self.current_level = self.hierarchy.go_down_one_level(level);
            if let Some(next) = self.current_level {
                self.stats.recount_top_partitions(&self.hierarchy, next);
            }
        }
        debug!("block phase done");

        if self.config.use_means {
            self.stats.compute_means(&self.hierarchy, &loaded.quantized);
        }
        for _ in 0..PIXEL_PASSES {
            let forward = self.forward;
            self.forward = !forward;
            optimize::update_pixels(
                &mut self.hierarchy,
                &mut self.stats,
                &loaded.quantized,
                &self.config,
                forward,
            );
        }

        let superpixels = self.count_superpixels()?;
        info!(superpixels, "pixel phase done");
        Ok(())
    }

    /// The superpixel id grid, shape (height, width).
    pub fn labels(&self) -> Result<&Array2<u32>> {
        if self.loaded.is_none() {
            return Err(TesselError::NotInitialized);
        }
        Ok(self.hierarchy.top_labels())
    }

    /// Distinct superpixel ids actually present in the grid.
    pub fn count_superpixels(&self) -> Result<usize> {
        let labels = self.labels()?;
        let mut seen = vec![false; self.hierarchy.label_count(self.hierarchy.top_level())];
        for &label in labels.iter() {
            seen[label as usize] = true;
        }
        Ok(seen.iter().filter(|&&s| s).count())
    }

    /// The label grid as an owned, serializable map.
    pub fn label_map(&self) -> Result<LabelMap> {
        Ok(LabelMap::new(self.labels()?.clone()))
    }

    /// Reconstruction of the image with every pixel replaced by its
    /// superpixel's mean color. Meaningful after `iterate`.
    pub fn mean_map(&self) -> Result<RgbImage> {
        let loaded = self.loaded.as_ref().ok_or(TesselError::NotInitialized)?;
        if !self.config.use_means {
            return Err(TesselError::MeansDisabled);
        }
        let top = self.hierarchy.top_level();
        let mut out = RgbImage::new(self.width() as u32, self.height() as u32);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let label = self.hierarchy.top_label(x, y);
                let mean = self.stats.mean_of(top, label);
                let rgb = loaded.quantizer.descriptor_to_rgb(mean);
                out.put_pixel(x as u32, y as u32, Rgb(rgb));
            }
        }
        Ok(out)
    }
}
