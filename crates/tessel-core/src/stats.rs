use ndarray::Array2;

use crate::hierarchy::LabelHierarchy;
use crate::quantize::QuantizedImage;

/// Aggregate color statistics per (level, label): joint histogram, owned
/// pixel count `T`, directly-owned sub-block count, and (top level only)
/// running continuous channel sums for the mean-color criterion.
///
/// All bookkeeping is exact and reversible: every add has a matching delete
/// and the optimizers rely on detach/reattach leaving state bit-identical.
#[derive(Debug)]
pub struct LabelStatistics {
    bin_count: usize,
    /// Per level: (label_count, bin_count) counts.
    histograms: Vec<Array2<u32>>,
    /// Per level: pixels owned by each label.
    sizes: Vec<Vec<u32>>,
    /// Per level: sub-blocks directly owned by each label.
    partitions: Vec<Vec<u32>>,
    /// Top level only: running channel sums for the means criterion.
    means: Vec<[f32; 3]>,
}

impl LabelStatistics {
    pub fn new(hierarchy: &LabelHierarchy, bin_count: usize) -> Self {
        let levels = hierarchy.levels();
        let histograms = (0..levels)
            .map(|level| Array2::<u32>::zeros((hierarchy.label_count(level), bin_count)))
            .collect();
        let sizes = (0..levels)
            .map(|level| vec![0u32; hierarchy.label_count(level)])
            .collect();
        let partitions = (0..levels)
            .map(|level| vec![0u32; hierarchy.label_count(level)])
            .collect();
        let means = vec![[0.0f32; 3]; hierarchy.label_count(levels - 1)];
        Self {
            bin_count,
            histograms,
            sizes,
            partitions,
            means,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn size(&self, level: usize, label: u32) -> u32 {
        self.sizes[level][label as usize]
    }

    pub fn sizes(&self, level: usize) -> &[u32] {
        &self.sizes[level]
    }

    pub fn partitions(&self, level: usize, label: u32) -> u32 {
        self.partitions[level][label as usize]
    }

    pub fn histogram_bin(&self, level: usize, label: u32, bin: usize) -> u32 {
        self.histograms[level][(label as usize, bin)]
    }

    /// Running mean of the continuous channels for a top-level label.
    pub fn mean_of(&self, top_level: usize, label: u32) -> [f32; 3] {
        let t = self.sizes[top_level][label as usize] as f32;
        let sums = self.means[label as usize];
        [sums[0] / t, sums[1] / t, sums[2] / t]
    }

    pub fn add_pixel(&mut self, level: usize, label: u32, bin: usize) {
        self.histograms[level][(label as usize, bin)] += 1;
        self.sizes[level][label as usize] += 1;
    }

    pub fn delete_pixel(&mut self, level: usize, label: u32, bin: usize) {
        self.histograms[level][(label as usize, bin)] -= 1;
        self.sizes[level][label as usize] -= 1;
    }

    pub fn add_means(&mut self, label: u32, descriptor: [f32; 3]) {
        let sums = &mut self.means[label as usize];
        sums[0] += descriptor[0];
        sums[1] += descriptor[1];
        sums[2] += descriptor[2];
    }

    pub fn sub_means(&mut self, label: u32, descriptor: [f32; 3]) {
        let sums = &mut self.means[label as usize];
        sums[0] -= descriptor[0];
        sums[1] -= descriptor[1];
        sums[2] -= descriptor[2];
    }

    /// Fold a sub-block's statistics into a coarser label. The parent link
    /// is the hierarchy's half of the same edit.
    pub fn add_block(&mut self, level: usize, label: u32, sublevel: usize, sublabel: usize) {
        for bin in 0..self.bin_count {
            let count = self.histograms[sublevel][(sublabel, bin)];
            self.histograms[level][(label as usize, bin)] += count;
        }
        self.sizes[level][label as usize] += self.sizes[sublevel][sublabel];
        self.partitions[level][label as usize] += 1;
    }

    /// Exact inverse of `add_block`.
    pub fn delete_block(&mut self, level: usize, label: u32, sublevel: usize, sublabel: usize) {
        for bin in 0..self.bin_count {
            let count = self.histograms[sublevel][(sublabel, bin)];
            self.histograms[level][(label as usize, bin)] -= count;
        }
        self.sizes[level][label as usize] -= self.sizes[sublevel][sublabel];
        self.partitions[level][label as usize] -= 1;
    }

    /// Rebuild everything bottom-up from the quantized pixels: level 0 by
    /// pixel, every coarser level by folding its children. Level-0 blocks
    /// have no sub-partitions; their count is pinned to 1.
    pub fn rebuild(&mut self, hierarchy: &LabelHierarchy, quantized: &QuantizedImage) {
        for histogram in &mut self.histograms {
            histogram.fill(0);
        }
        for sizes in &mut self.sizes {
            sizes.fill(0);
        }
        for partitions in &mut self.partitions {
            partitions.fill(0);
        }
        self.partitions[0].fill(1);

        for y in 0..hierarchy.height() {
            for x in 0..hierarchy.width() {
                let label = hierarchy.label_at(0, x, y);
                self.add_pixel(0, label, quantized.bin(x, y));
            }
        }
        for level in 1..hierarchy.levels() {
            for sublabel in 0..hierarchy.label_count(level - 1) {
                let parent = hierarchy.owner(level - 1, sublabel);
                self.add_block(level, parent, level - 1, sublabel);
            }
        }
    }

    /// Re-accumulate the top-level partition totals from `level`'s counts
    /// through the freshly composed parents (the second half of descending
    /// one level).
    pub fn recount_top_partitions(&mut self, hierarchy: &LabelHierarchy, level: usize) {
        let top = hierarchy.top_level();
        self.partitions[top].fill(0);
        for label in 0..hierarchy.label_count(level) {
            let owner = hierarchy.owner(level, label);
            self.partitions[top][owner as usize] += self.partitions[level][label];
        }
    }

    /// Zero and re-sum the top-level channel sums from pixel descriptors.
    /// Run once before the means pixel phase; pixel moves keep the sums
    /// current afterwards.
    pub fn compute_means(&mut self, hierarchy: &LabelHierarchy, quantized: &QuantizedImage) {
        self.means.fill([0.0; 3]);
        for y in 0..hierarchy.height() {
            for x in 0..hierarchy.width() {
                let label = hierarchy.top_label(x, y);
                self.add_means(label, quantized.descriptor(x, y));
            }
        }
    }

    /// Similarity of two labels' histograms. Per bin, the side with the
    /// smaller normalized count contributes its raw count to its own sum;
    /// the comparison uses `count * opposite T` cross products so no per-bin
    /// division happens. The two sums are normalized by their own totals and
    /// added; higher means more similar color distributions.
    pub fn intersection(&self, level_a: usize, label_a: u32, level_b: usize, label_b: u32) -> f32 {
        let t_a = self.sizes[level_a][label_a as usize] as u64;
        let t_b = self.sizes[level_b][label_b as usize] as u64;
        let mut sum_a: u64 = 0;
        let mut sum_b: u64 = 0;
        for bin in 0..self.bin_count {
            let h_a = self.histograms[level_a][(label_a as usize, bin)] as u64;
            let h_b = self.histograms[level_b][(label_b as usize, bin)] as u64;
            if h_a * t_b < h_b * t_a {
                sum_a += h_a;
            } else {
                sum_b += h_b;
            }
        }
        sum_a as f32 / t_a as f32 + sum_b as f32 / t_b as f32
    }
}
