use ndarray::Array2;

use crate::config::SegmentationConfig;
use crate::error::{Result, TesselError};

/// Owner link of a block at the next-coarser level. `Detached` only exists
/// transiently inside a block move, between `detach_block` and the
/// reattachment that always follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
    Attached(u32),
    Detached,
}

impl Parent {
    /// The attached owner label. Scans only read parents outside the
    /// detach/reattach window, so a detached link here is a bookkeeping bug.
    pub fn label(self) -> u32 {
        match self {
            Self::Attached(label) => label,
            Self::Detached => unreachable!("block is detached"),
        }
    }
}

/// The layered label state: one full-resolution label grid per level, block
/// grid dimensions per level, and parent links wiring each level into the
/// next. Level 0 is the finest; the top level's grid holds the superpixel
/// ids and is kept in sync as a cache after every structural change.
#[derive(Debug)]
pub struct LabelHierarchy {
    width: usize,
    height: usize,
    block_width: usize,
    block_height: usize,
    grids: Vec<(usize, usize)>,
    labels: Vec<Array2<u32>>,
    parents: Vec<Vec<Parent>>,
}

/// Per-level block grid dimensions `(nr_w, nr_h)` for an image and config.
/// Level 0 divides the image by the base block size (floor); every further
/// level halves both dimensions. Errors if the grid degenerates.
pub fn level_grids(
    width: usize,
    height: usize,
    config: &SegmentationConfig,
) -> Result<Vec<(usize, usize)>> {
    if width == 0 || height == 0 {
        return Err(TesselError::InvalidDimensions { width, height });
    }
    if config.block_width == 0
        || config.block_height == 0
        || config.block_width > width
        || config.block_height > height
    {
        return Err(TesselError::InvalidBlockSize {
            block_width: config.block_width,
            block_height: config.block_height,
            width,
            height,
        });
    }
    if config.bins_per_channel == 0 {
        return Err(TesselError::InvalidBinCount);
    }

    let mut nr_w = width / config.block_width;
    let mut nr_h = height / config.block_height;
    let mut max = 1;
    while nr_w / 2 >= 1 && nr_h / 2 >= 1 {
        nr_w /= 2;
        nr_h /= 2;
        max += 1;
    }
    if config.levels == 0 || config.levels > max {
        return Err(TesselError::InvalidLevelCount {
            levels: config.levels,
            max,
        });
    }

    let mut grids = Vec::with_capacity(config.levels);
    let mut nr_w = width / config.block_width;
    let mut nr_h = height / config.block_height;
    grids.push((nr_w, nr_h));
    for _ in 1..config.levels {
        nr_w /= 2;
        nr_h /= 2;
        grids.push((nr_w, nr_h));
    }
    Ok(grids)
}

impl LabelHierarchy {
    /// Validate the configuration against the image dimensions and allocate
    /// all levels. Labels and parents are filled by `assign_labels`.
    pub fn new(width: usize, height: usize, config: &SegmentationConfig) -> Result<Self> {
        let grids = level_grids(width, height, config)?;
        let labels = grids
            .iter()
            .map(|_| Array2::<u32>::zeros((height, width)))
            .collect();
        let parents = grids
            .iter()
            .map(|&(w, h)| vec![Parent::Detached; w * h])
            .collect();
        let mut hierarchy = Self {
            width,
            height,
            block_width: config.block_width,
            block_height: config.block_height,
            grids,
            labels,
            parents,
        };
        hierarchy.assign_labels();
        Ok(hierarchy)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn levels(&self) -> usize {
        self.grids.len()
    }

    pub fn top_level(&self) -> usize {
        self.grids.len() - 1
    }

    pub fn grid(&self, level: usize) -> (usize, usize) {
        self.grids[level]
    }

    pub fn label_count(&self, level: usize) -> usize {
        let (w, h) = self.grids[level];
        w * h
    }

    /// Deterministically label every level's grid and wire the parents.
    /// Pixels past the last full block are clamped into the last block, so
    /// every pixel is assigned. Called at construction and on every image
    /// (re)load.
    pub fn assign_labels(&mut self) {
        let mut step_w = self.block_width;
        let mut step_h = self.block_height;
        for level in 0..self.levels() {
            if level > 0 {
                step_w *= 2;
                step_h *= 2;
            }
            let (nr_w, nr_h) = self.grids[level];
            for y in 0..self.height {
                let label_y = (y / step_h).min(nr_h - 1);
                for x in 0..self.width {
                    let label_x = (x / step_w).min(nr_w - 1);
                    let label = (label_y * nr_w + label_x) as u32;
                    self.labels[level][(y, x)] = label;
                    if level > 0 {
                        let child = self.labels[level - 1][(y, x)];
                        self.parents[level - 1][child as usize] = Parent::Attached(label);
                    }
                }
            }
        }
    }

    pub fn parent(&self, level: usize, label: usize) -> Parent {
        self.parents[level][label]
    }

    /// The top-level owner of a block, assuming the parent chain for this
    /// level has been composed down to the top.
    pub fn owner(&self, level: usize, label: usize) -> u32 {
        self.parents[level][label].label()
    }

    pub fn set_parent(&mut self, level: usize, label: usize, parent: Parent) {
        self.parents[level][label] = parent;
    }

    pub fn label_at(&self, level: usize, x: usize, y: usize) -> u32 {
        self.labels[level][(y, x)]
    }

    /// Superpixel id of a pixel (the top-level cache).
    pub fn top_label(&self, x: usize, y: usize) -> u32 {
        self.labels[self.top_level()][(y, x)]
    }

    /// Flat row-major read of the top-level cache; the pixel-phase prior
    /// windows index flat and may step past a row end.
    pub fn top_label_flat(&self, index: usize) -> u32 {
        self.labels[self.top_level()][(index / self.width, index % self.width)]
    }

    pub fn set_top_label(&mut self, x: usize, y: usize, label: u32) {
        let top = self.top_level();
        self.labels[top][(y, x)] = label;
    }

    pub fn top_labels(&self) -> &Array2<u32> {
        &self.labels[self.top_level()]
    }

    /// Rewrite the top-level cache from `level`'s labels and parents, after
    /// a block sweep has moved ownership around.
    pub fn refresh_top_labels(&mut self, level: usize) {
        let top = self.top_level();
        debug_assert!(level < top);
        let (lower, upper) = self.labels.split_at_mut(top);
        let source = &lower[level];
        let cache = &mut upper[0];
        for (cached, &label) in cache.iter_mut().zip(source.iter()) {
            *cached = self.parents[level][label as usize].label();
        }
    }

    /// Compose `current - 1`'s parents through `current`'s so the lower
    /// level points directly at top-level labels. Returns the new current
    /// level, or `None` once level 0 has been optimized. The caller recounts
    /// the top-level partition totals afterwards.
    pub fn go_down_one_level(&mut self, current: usize) -> Option<usize> {
        if current == 0 {
            return None;
        }
        let new_level = current - 1;
        for label in 0..self.label_count(new_level) {
            let mid = self.parents[new_level][label].label();
            let top = self.parents[current][mid as usize];
            self.parents[new_level][label] = top;
        }
        Some(new_level)
    }
}
