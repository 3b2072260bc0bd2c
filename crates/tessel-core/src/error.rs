use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesselError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("base block size {block_width}x{block_height} does not fit a {width}x{height} image")]
    InvalidBlockSize {
        block_width: usize,
        block_height: usize,
        width: usize,
        height: usize,
    },

    #[error("{levels} hierarchy levels coarsen the block grid below 1x1 (at most {max} fit)")]
    InvalidLevelCount { levels: usize, max: usize },

    #[error("histogram needs at least one bin per channel")]
    InvalidBinCount,

    #[error("image size {got_width}x{got_height} does not match segmenter size {width}x{height}")]
    ImageSizeMismatch {
        got_width: usize,
        got_height: usize,
        width: usize,
        height: usize,
    },

    #[error("no image loaded; call load_image before iterate")]
    NotInitialized,

    #[error("mean-color map requires use_means in the configuration")]
    MeansDisabled,

    #[error("invalid label map: {0}")]
    InvalidLabelMap(String),

    #[error("image format error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TesselError>;
