//! Boundary optimizers: block-level label exchange during the descent and
//! the pixel-level refinement passes that follow.

mod block;
mod pixel;
mod split;

pub use block::update_blocks;
pub use pixel::update_pixels;
pub use split::{splits_region, Orientation, ScanOrder};

use crate::hierarchy::{LabelHierarchy, Parent};
use crate::stats::LabelStatistics;

/// Detach a sub-block from its owning superpixel: the parent link and the
/// aggregate statistics change together.
pub(crate) fn detach_block(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    owner: u32,
    level: usize,
    sublabel: usize,
) {
    let top = hierarchy.top_level();
    hierarchy.set_parent(level, sublabel, Parent::Detached);
    stats.delete_block(top, owner, level, sublabel);
}

/// Attach a detached sub-block to a superpixel.
pub(crate) fn attach_block(
    hierarchy: &mut LabelHierarchy,
    stats: &mut LabelStatistics,
    owner: u32,
    level: usize,
    sublabel: usize,
) {
    let top = hierarchy.top_level();
    hierarchy.set_parent(level, sublabel, Parent::Attached(owner));
    stats.add_block(top, owner, level, sublabel);
}
