pub mod config;
pub mod consts;
pub mod error;
pub mod hierarchy;
pub mod labelmap;
pub mod optimize;
pub mod quantize;
pub mod segmenter;
pub mod stats;
