//! Per-pixel background color estimation.
//!
//! Each pixel's neighbourhood is sorted by gray level and scanned for the
//! largest cluster of samples that agree both in gray level and in color.
//! The representative of that cluster becomes the local background.
pub mod estimator;
pub mod options;
pub mod sort;

pub use estimator::estimate_background;
pub use options::BackgroundOptions;
pub use sort::merge_sort_pairs;
