/// Number of pixel-level boundary passes run after the block phase.
pub const PIXEL_PASSES: usize = 4;

/// A superpixel never gives up a sub-block once it is down to this many.
pub const MIN_PARTITIONS: u32 = 1;

/// Sampling stride (both axes) for building the adaptive Lab bin cutoffs.
pub const CUTOFF_SAMPLE_STRIDE: usize = 5;

/// Upper sentinel for the last adaptive cutoff, above any attainable
/// channel value (L <= 100, a/b within roughly +-128).
pub const CUTOFF_SENTINEL: f32 = 300.0;

/// Default base block width at the finest level.
pub const DEFAULT_BLOCK_WIDTH: usize = 3;

/// Default base block height at the finest level.
pub const DEFAULT_BLOCK_HEIGHT: usize = 4;

/// Default number of hierarchy levels.
pub const DEFAULT_LEVELS: usize = 4;

/// Default histogram bins per color channel (joint size = bins^3).
pub const DEFAULT_BINS_PER_CHANNEL: usize = 5;

/// Default intersection margin for the confidence-gated block pass.
pub const DEFAULT_REQUIRED_CONFIDENCE: f32 = 0.1;
