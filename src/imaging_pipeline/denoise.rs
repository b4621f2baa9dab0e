//! Infrared denoising module
//!
//! Edge-preserving median filtering of raw 16-bit NIR frames.

pub mod median_filter;
pub mod types;


pub use median_filter::{sorted_window_median, RollingMedianFilter};
pub use types::{BorderPolicy, MedianFilterConfig};
