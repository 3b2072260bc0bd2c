pub mod info;
pub mod segment;
