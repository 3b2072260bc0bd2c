mod common;

use approx::assert_abs_diff_eq;
use tessel_core::quantize::{quantize_image, Quantizer};
use tessel_core::stats::LabelStatistics;

use common::{config, noise_image, setup, solid_image, split_image};

#[test]
fn rebuild_conserves_pixels_at_every_level() {
    let image = noise_image(24, 16, 1);
    let (hierarchy, stats, _) = setup(&image, &config(2, 2, 3));
    for level in 0..hierarchy.levels() {
        let total: u32 = stats.sizes(level).iter().sum();
        assert_eq!(total, 24 * 16, "level {level}");
    }
}

#[test]
fn rebuild_sets_base_partitions_to_one() {
    let image = noise_image(16, 16, 2);
    let (hierarchy, stats, _) = setup(&image, &config(2, 2, 2));
    for label in 0..hierarchy.label_count(0) {
        assert_eq!(stats.partitions(0, label as u32), 1);
    }
}

#[test]
fn parent_statistics_equal_sum_of_children() {
    let image = noise_image(16, 16, 3);
    let (hierarchy, stats, _) = setup(&image, &config(2, 2, 2));
    for parent in 0..hierarchy.label_count(1) {
        let children: Vec<usize> = (0..hierarchy.label_count(0))
            .filter(|&child| hierarchy.owner(0, child) == parent as u32)
            .collect();
        assert_eq!(stats.partitions(1, parent as u32), children.len() as u32);

        let child_size: u32 = children
            .iter()
            .map(|&child| stats.size(0, child as u32))
            .sum();
        assert_eq!(stats.size(1, parent as u32), child_size);

        for bin in 0..stats.bin_count() {
            let child_sum: u32 = children
                .iter()
                .map(|&child| stats.histogram_bin(0, child as u32, bin))
                .sum();
            assert_eq!(stats.histogram_bin(1, parent as u32, bin), child_sum);
        }
    }
}

#[test]
fn add_and_delete_pixel_are_inverse() {
    let image = noise_image(8, 8, 4);
    let (_, mut stats, quantized) = setup(&image, &config(2, 2, 1));
    let bin = quantized.bin(3, 3);
    let size_before = stats.size(0, 2);
    let hist_before = stats.histogram_bin(0, 2, bin);

    stats.add_pixel(0, 2, bin);
    assert_eq!(stats.size(0, 2), size_before + 1);
    assert_eq!(stats.histogram_bin(0, 2, bin), hist_before + 1);

    stats.delete_pixel(0, 2, bin);
    assert_eq!(stats.size(0, 2), size_before);
    assert_eq!(stats.histogram_bin(0, 2, bin), hist_before);
}

#[test]
fn add_and_delete_block_are_inverse() {
    let image = noise_image(16, 16, 5);
    let (hierarchy, mut stats, _) = setup(&image, &config(2, 2, 2));
    let owner = hierarchy.owner(0, 0);
    let other = owner + 1;

    let size_owner = stats.size(1, owner);
    let size_other = stats.size(1, other);
    let parts_other = stats.partitions(1, other);

    stats.delete_block(1, owner, 0, 0);
    stats.add_block(1, other, 0, 0);
    assert_eq!(stats.size(1, owner), size_owner - stats.size(0, 0));
    assert_eq!(stats.size(1, other), size_other + stats.size(0, 0));
    assert_eq!(stats.partitions(1, other), parts_other + 1);

    stats.delete_block(1, other, 0, 0);
    stats.add_block(1, owner, 0, 0);
    assert_eq!(stats.size(1, owner), size_owner);
    assert_eq!(stats.size(1, other), size_other);
    assert_eq!(stats.partitions(1, other), parts_other);
}

#[test]
fn intersection_of_identical_distributions_is_one() {
    // Uniform image: every label has the same single-bin histogram.
    let image = solid_image(8, 8, [90, 40, 160]);
    let (_, stats, _) = setup(&image, &config(2, 2, 1));
    assert_abs_diff_eq!(stats.intersection(0, 0, 0, 1), 1.0);
}

#[test]
fn intersection_of_disjoint_distributions_is_zero() {
    // Seam on the block boundary: label 0 is all red, label 1 all green.
    let image = split_image(8, 4, [255, 0, 0], [0, 255, 0]);
    let (hierarchy, stats, _) = setup(&image, &config(4, 4, 1));
    assert_eq!(hierarchy.grid(0), (2, 1));
    assert_abs_diff_eq!(stats.intersection(0, 0, 0, 1), 0.0);
}

#[test]
fn compute_means_on_uniform_image() {
    let image = solid_image(8, 8, [128, 128, 128]);
    let cfg = config(2, 2, 1);
    let (hierarchy, mut stats, quantized) = setup(&image, &cfg);
    stats.compute_means(&hierarchy, &quantized);
    let mean = stats.mean_of(hierarchy.top_level(), 0);
    let descriptor = quantized.descriptor(0, 0);
    for channel in 0..3 {
        assert_abs_diff_eq!(mean[channel], descriptor[channel], epsilon = 1e-5);
    }
}

#[test]
fn means_track_pixel_moves() {
    let image = split_image(8, 4, [255, 0, 0], [0, 255, 0]);
    let cfg = config(4, 4, 1);
    let hierarchy = tessel_core::hierarchy::LabelHierarchy::new(8, 4, &cfg).unwrap();
    let quantizer = Quantizer::new(cfg.color_space, cfg.bins_per_channel, &image);
    let quantized = quantize_image(&image, &quantizer);
    let mut stats = LabelStatistics::new(&hierarchy, quantizer.bin_count());
    stats.rebuild(&hierarchy, &quantized);
    stats.compute_means(&hierarchy, &quantized);

    let before = stats.mean_of(0, 0);
    let descriptor = quantized.descriptor(0, 0);
    stats.sub_means(0, descriptor);
    stats.add_means(0, descriptor);
    let after = stats.mean_of(0, 0);
    for channel in 0..3 {
        assert_abs_diff_eq!(before[channel], after[channel], epsilon = 1e-5);
    }
}
