use super::split::{splits_region, Orientation, ScanOrder};
use crate::config::SegmentationConfig;
use crate::hierarchy::LabelHierarchy;
use crate::quantize::QuantizedImage;
use crate::stats::LabelStatistics;

/// One pixel refinement pass over the superpixel boundaries: a horizontal
/// sweep, a vertical sweep, then the image-border reconciliation.
///
/// `forward` selects which side of each boundary is offered first; the
/// caller alternates it between passes so boundaries drift symmetrically.
/// Decisions use the mean-color distance when `use_means` is set and the
/// histogram probability otherwise, optionally weighted by the local
/// same-label neighbor count.
pub fn update_pixels(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    quantized: &QuantizedImage,
    config: &SegmentationConfig,
    forward: bool,
) {
    let width = hierarchy.width();
    let height = hierarchy.height();
    let top = hierarchy.top_level();

    // Horizontal boundaries: (x, y) against (x+1, y).
    let mut y = 1;
    while y + 1 < height {
        let mut x = 1;
        while x + 2 < width {
            let label_a = hierarchy.top_label(x, y);
            let label_b = hierarchy.top_label(x + 1, y);
            if label_a != label_b {
                let left = label_window(hierarchy, x, y);
                let right = label_window(hierarchy, x + 1, y);
                if forward {
                    if !splits_region(&left, Orientation::Horizontal, ScanOrder::Forward) {
                        let (prior_a, prior_b) =
                            horizontal_priors(hierarchy, config, x, y, label_a, label_b);
                        if should_move(stats, quantized, config, top, x, y, label_a, label_b, prior_a, prior_b)
                        {
                            move_pixel(hierarchy, stats, quantized, config, x, y, label_b);
                        } else if !splits_region(&right, Orientation::Horizontal, ScanOrder::Backward)
                            && should_move(
                                stats, quantized, config, top, x + 1, y, label_b, label_a, prior_b,
                                prior_a,
                            )
                        {
                            move_pixel(hierarchy, stats, quantized, config, x + 1, y, label_a);
                            x += 1;
                        }
                    }
                } else if !splits_region(&right, Orientation::Horizontal, ScanOrder::Backward) {
                    let (prior_a, prior_b) =
                        horizontal_priors(hierarchy, config, x, y, label_a, label_b);
                    if should_move(
                        stats, quantized, config, top, x + 1, y, label_b, label_a, prior_b, prior_a,
                    ) {
                        move_pixel(hierarchy, stats, quantized, config, x + 1, y, label_a);
                        x += 1;
                    } else if !splits_region(&left, Orientation::Horizontal, ScanOrder::Forward)
                        && should_move(stats, quantized, config, top, x, y, label_a, label_b, prior_a, prior_b)
                    {
                        move_pixel(hierarchy, stats, quantized, config, x, y, label_b);
                    }
                }
            }
            x += 1;
        }
        y += 1;
    }

    // Vertical boundaries: (x, y) against (x, y+1).
    let mut x = 1;
    while x + 1 < width {
        let mut y = 1;
        while y + 2 < height {
            let label_a = hierarchy.top_label(x, y);
            let label_b = hierarchy.top_label(x, y + 1);
            if label_a != label_b {
                let upper = label_window(hierarchy, x, y);
                let lower = label_window(hierarchy, x, y + 1);
                if forward {
                    if !splits_region(&upper, Orientation::Vertical, ScanOrder::Forward) {
                        let (prior_a, prior_b) =
                            vertical_priors(hierarchy, config, x, y, label_a, label_b);
                        if should_move(stats, quantized, config, top, x, y, label_a, label_b, prior_a, prior_b)
                        {
                            move_pixel(hierarchy, stats, quantized, config, x, y, label_b);
                        } else if !splits_region(&lower, Orientation::Vertical, ScanOrder::Backward)
                            && should_move(
                                stats, quantized, config, top, x, y + 1, label_b, label_a, prior_b,
                                prior_a,
                            )
                        {
                            move_pixel(hierarchy, stats, quantized, config, x, y + 1, label_a);
                            y += 1;
                        }
                    }
                } else if !splits_region(&lower, Orientation::Vertical, ScanOrder::Backward) {
                    let (prior_a, prior_b) =
                        vertical_priors(hierarchy, config, x, y, label_a, label_b);
                    if should_move(
                        stats, quantized, config, top, x, y + 1, label_b, label_a, prior_b, prior_a,
                    ) {
                        move_pixel(hierarchy, stats, quantized, config, x, y + 1, label_a);
                        y += 1;
                    } else if !splits_region(&upper, Orientation::Vertical, ScanOrder::Forward)
                        && should_move(stats, quantized, config, top, x, y, label_a, label_b, prior_a, prior_b)
                    {
                        move_pixel(hierarchy, stats, quantized, config, x, y, label_b);
                    }
                }
            }
            y += 1;
        }
        x += 1;
    }

    // The sweeps never visit the outermost rows and columns; pull every
    // border pixel that disagrees with its inward neighbor over to that
    // neighbor's superpixel.
    if height >= 2 {
        for x in 0..width {
            let inward = hierarchy.top_label(x, 1);
            if hierarchy.top_label(x, 0) != inward {
                move_pixel(hierarchy, stats, quantized, config, x, 0, inward);
            }
            let inward = hierarchy.top_label(x, height - 2);
            if hierarchy.top_label(x, height - 1) != inward {
                move_pixel(hierarchy, stats, quantized, config, x, height - 1, inward);
            }
        }
    }
    if width >= 2 {
        for y in 0..height {
            let inward = hierarchy.top_label(1, y);
            if hierarchy.top_label(0, y) != inward {
                move_pixel(hierarchy, stats, quantized, config, 0, y, inward);
            }
            let inward = hierarchy.top_label(width - 2, y);
            if hierarchy.top_label(width - 1, y) != inward {
                move_pixel(hierarchy, stats, quantized, config, width - 1, y, inward);
            }
        }
    }
}

/// Reassign one pixel, keeping histogram, size and (in means mode) channel
/// sums exact.
fn move_pixel(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    quantized: &QuantizedImage,
    config: &SegmentationConfig,
    x: usize,
    y: usize,
    new_label: u32,
) {
    let top = hierarchy.top_level();
    let old_label = hierarchy.top_label(x, y);
    let bin = quantized.bin(x, y);
    stats.delete_pixel(top, old_label, bin);
    stats.add_pixel(top, new_label, bin);
    if config.use_means {
        let descriptor = quantized.descriptor(x, y);
        stats.sub_means(old_label, descriptor);
        stats.add_means(new_label, descriptor);
    }
    hierarchy.set_top_label(x, y, new_label);
}

/// Does the pixel at (x, y) fit `to` better than `from`? Both labels'
/// statistics still include the pixel itself.
#[allow(clippy::too_many_arguments)]
fn should_move(
    stats: &LabelStatistics,
    quantized: &QuantizedImage,
    config: &SegmentationConfig,
    top_level: usize,
    x: usize,
    y: usize,
    from: u32,
    to: u32,
    prior_from: u32,
    prior_to: u32,
) -> bool {
    if config.use_means {
        let c = quantized.descriptor(x, y);
        let mut d_from = squared_distance(c, stats.mean_of(top_level, from));
        let mut d_to = squared_distance(c, stats.mean_of(top_level, to));
        if config.spatial_prior {
            d_from /= prior_from as f32;
            d_to /= prior_to as f32;
        }
        d_from > d_to
    } else {
        let bin = quantized.bin(x, y);
        let mut p_from =
            stats.histogram_bin(top_level, from, bin) as f32 / stats.size(top_level, from) as f32;
        let mut p_to =
            stats.histogram_bin(top_level, to, bin) as f32 / stats.size(top_level, to) as f32;
        if config.spatial_prior {
            p_from *= prior_from as f32;
            p_to *= prior_to as f32;
        }
        p_to > p_from
    }
}

fn squared_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

fn label_window(hierarchy: &LabelHierarchy, cx: usize, cy: usize) -> [u32; 9] {
    [
        hierarchy.top_label(cx - 1, cy - 1),
        hierarchy.top_label(cx, cy - 1),
        hierarchy.top_label(cx + 1, cy - 1),
        hierarchy.top_label(cx - 1, cy),
        hierarchy.top_label(cx, cy),
        hierarchy.top_label(cx + 1, cy),
        hierarchy.top_label(cx - 1, cy + 1),
        hierarchy.top_label(cx, cy + 1),
        hierarchy.top_label(cx + 1, cy + 1),
    ]
}

fn horizontal_priors(
    hierarchy: &LabelHierarchy,
    config: &SegmentationConfig,
    x: usize,
    y: usize,
    label_a: u32,
    label_b: u32,
) -> (u32, u32) {
    if !config.spatial_prior {
        return (0, 0);
    }
    (
        prior_three_by_four(hierarchy, x, y, label_a),
        prior_three_by_four(hierarchy, x, y, label_b),
    )
}

fn vertical_priors(
    hierarchy: &LabelHierarchy,
    config: &SegmentationConfig,
    x: usize,
    y: usize,
    label_a: u32,
    label_b: u32,
) -> (u32, u32) {
    if !config.spatial_prior {
        return (0, 0);
    }
    (
        prior_four_by_three(hierarchy, x, y, label_a),
        prior_four_by_three(hierarchy, x, y, label_b),
    )
}

/// Same-label count in the 3x4 ring around the horizontal pixel pair at
/// (x, y)-(x+1, y). Flat indexing keeps the reference scan order.
fn prior_three_by_four(hierarchy: &LabelHierarchy, x: usize, y: usize, label: u32) -> u32 {
    let w = hierarchy.width();
    let base = y * w + x;
    let ring = [
        base - w - 1,
        base - w,
        base - w + 1,
        base - w + 2,
        base - 1,
        base + 2,
        base + w - 1,
        base + w,
        base + w + 1,
        base + w + 2,
    ];
    count_matching(hierarchy, &ring, label)
}

/// Same-label count in the 4x3 ring around the vertical pixel pair at
/// (x, y)-(x, y+1). The two `+2` column reads follow the flat layout and
/// wrap onto the next row when the pair sits against the right edge, which
/// the scan bounds permit.
fn prior_four_by_three(hierarchy: &LabelHierarchy, x: usize, y: usize, label: u32) -> u32 {
    let w = hierarchy.width();
    let base = y * w + x;
    let ring = [
        base - w - 1,
        base - w,
        base - w + 1,
        base - 1,
        base + 2,
        base + w - 1,
        base + w + 2,
        base + 2 * w - 1,
        base + 2 * w,
        base + 2 * w + 1,
    ];
    count_matching(hierarchy, &ring, label)
}

fn count_matching(hierarchy: &LabelHierarchy, ring: &[usize; 10], label: u32) -> u32 {
    ring.iter()
        .filter(|&&index| hierarchy.top_label_flat(index) == label)
        .count() as u32
}
