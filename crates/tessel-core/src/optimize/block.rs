use super::split::{splits_region, Orientation, ScanOrder};
use super::{attach_block, detach_block};
use crate::consts::MIN_PARTITIONS;
use crate::hierarchy::LabelHierarchy;
use crate::stats::LabelStatistics;

/// One bidirectional block sweep over `level`: horizontal boundaries first,
/// then vertical, refreshing the superpixel label cache after each.
///
/// Every interior boundary between two different superpixels is examined
/// from both sides. The first side that wins its exchange ends the contest
/// for that boundary; a win from the second side also advances the cursor
/// past the moved block so it is not reconsidered in the same sweep.
///
/// With `required_confidence == 0.0` any strict intersection gain moves the
/// block; a positive margin additionally demands that much separation
/// between the two intersections.
pub fn update_blocks(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    level: usize,
    required_confidence: f32,
) {
    let top = hierarchy.top_level();
    let (nr_w, nr_h) = hierarchy.grid(level);

    // Horizontal boundaries: candidate cell (x, y) against (x+1, y).
    let mut y = 1;
    while y + 1 < nr_h {
        let mut x = 1;
        while x + 2 < nr_w {
            let sublabel = y * nr_w + x;
            let label_a = hierarchy.owner(level, sublabel);
            let label_b = hierarchy.owner(level, sublabel + 1);
            if label_a != label_b {
                #[rustfmt::skip]
                let cells = [
                    (x - 1, y - 1), (x, y - 1), (x + 1, y - 1), (x + 2, y - 1),
                    (x - 1, y), (x, y), (x + 1, y), (x + 2, y),
                    (x - 1, y + 1), (x, y + 1), (x + 1, y + 1), (x + 2, y + 1),
                ];
                let window = owner_window(hierarchy, level, nr_w, &cells);

                let mut moved = false;
                let parts_a = stats.partitions(top, label_a);
                if parts_a > MIN_PARTITIONS
                    && (parts_a <= 2
                        || !splits_region(
                            &left_of(&window),
                            Orientation::Horizontal,
                            ScanOrder::Forward,
                        ))
                {
                    moved = try_transfer(
                        hierarchy,
                        stats,
                        level,
                        sublabel,
                        label_a,
                        label_b,
                        required_confidence,
                    );
                }
                if !moved {
                    let parts_b = stats.partitions(top, label_b);
                    if parts_b > MIN_PARTITIONS
                        && (parts_b <= 2
                            || !splits_region(
                                &right_of(&window),
                                Orientation::Horizontal,
                                ScanOrder::Backward,
                            ))
                        && try_transfer(
                            hierarchy,
                            stats,
                            level,
                            sublabel + 1,
                            label_b,
                            label_a,
                            required_confidence,
                        )
                    {
                        // The right block joined A; skip past it.
                        x += 1;
                    }
                }
            }
            x += 1;
        }
        y += 1;
    }
    hierarchy.refresh_top_labels(level);

    // Vertical boundaries: candidate cell (x, y) against (x, y+1).
    let mut x = 1;
    while x + 1 < nr_w {
        let mut y = 1;
        while y + 2 < nr_h {
            let sublabel = y * nr_w + x;
            let label_a = hierarchy.owner(level, sublabel);
            let label_b = hierarchy.owner(level, sublabel + nr_w);
            if label_a != label_b {
                #[rustfmt::skip]
                let cells = [
                    (x - 1, y - 1), (x, y - 1), (x + 1, y - 1),
                    (x - 1, y), (x, y), (x + 1, y),
                    (x - 1, y + 1), (x, y + 1), (x + 1, y + 1),
                    (x - 1, y + 2), (x, y + 2), (x + 1, y + 2),
                ];
                let window = owner_window(hierarchy, level, nr_w, &cells);

                let mut moved = false;
                let parts_a = stats.partitions(top, label_a);
                if parts_a > MIN_PARTITIONS
                    && (parts_a <= 2
                        || !splits_region(
                            &upper_of(&window),
                            Orientation::Vertical,
                            ScanOrder::Forward,
                        ))
                {
                    moved = try_transfer(
                        hierarchy,
                        stats,
                        level,
                        sublabel,
                        label_a,
                        label_b,
                        required_confidence,
                    );
                }
                if !moved {
                    let parts_b = stats.partitions(top, label_b);
                    if parts_b > MIN_PARTITIONS
                        && (parts_b <= 2
                            || !splits_region(
                                &lower_of(&window),
                                Orientation::Vertical,
                                ScanOrder::Backward,
                            ))
                        && try_transfer(
                            hierarchy,
                            stats,
                            level,
                            sublabel + nr_w,
                            label_b,
                            label_a,
                            required_confidence,
                        )
                    {
                        y += 1;
                    }
                }
            }
            y += 1;
        }
        x += 1;
    }
    hierarchy.refresh_top_labels(level);
}

/// Detach `sublabel` from `from`, compare its intersection with both
/// superpixels on the statistics that now exclude it, and reattach to the
/// winner. Returns whether the block changed owner.
fn try_transfer(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    level: usize,
    sublabel: usize,
    from: u32,
    to: u32,
    required_confidence: f32,
) -> bool {
    let top = hierarchy.top_level();
    detach_block(hierarchy, stats, from, level, sublabel);
    let int_from = stats.intersection(top, from, level, sublabel as u32);
    let int_to = stats.intersection(top, to, level, sublabel as u32);
    let confidence = (int_from - int_to).abs();
    if int_to > int_from && confidence > required_confidence {
        attach_block(hierarchy, stats, to, level, sublabel);
        true
    } else {
        attach_block(hierarchy, stats, from, level, sublabel);
        false
    }
}

fn owner_window(
    hierarchy: &LabelHierarchy,
    level: usize,
    nr_w: usize,
    cells: &[(usize, usize); 12],
) -> [u32; 12] {
    cells.map(|(cx, cy)| hierarchy.owner(level, cy * nr_w + cx))
}

fn left_of(w: &[u32; 12]) -> [u32; 9] {
    [w[0], w[1], w[2], w[4], w[5], w[6], w[8], w[9], w[10]]
}

fn right_of(w: &[u32; 12]) -> [u32; 9] {
    [w[1], w[2], w[3], w[5], w[6], w[7], w[9], w[10], w[11]]
}

fn upper_of(w: &[u32; 12]) -> [u32; 9] {
    [w[0], w[1], w[2], w[3], w[4], w[5], w[6], w[7], w[8]]
}

fn lower_of(w: &[u32; 12]) -> [u32; 9] {
    [w[3], w[4], w[5], w[6], w[7], w[8], w[9], w[10], w[11]]
}
