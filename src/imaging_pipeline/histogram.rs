//! Intensity histogram analysis
//!
//! Builds 4096-bin histograms over the valid (unmasked) region of a frame
//! and locates percentile cutoffs. Shared by the exposure controller and the
//! percentile color scheme.

pub mod luminance;
pub mod percentile;

#[cfg(test)]
mod tests;

pub use luminance::{intensity_plane, luminance_12bit, luminance_plane};
pub use percentile::{
    normalize_fraction, IntensityHistogram, PercentileAnalyzer, ValidMask, DEFAULT_PERCENTILE,
};
