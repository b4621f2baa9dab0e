//! Pseudo-color mapping of infrared intensity
//!
//! Converts denoised NIR intensities into display RGB, either with a smooth
//! gradient over a user window or with flat bands at histogram percentiles.

pub mod calibration;
pub mod mapper;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use calibration::{calibrate_low_cutoff, DEFAULT_CALIBRATION_MARGIN};
pub use mapper::ColorMapper;
pub use thresholds::{
    enforce_strictly_increasing, ColorScheme, ColorThresholds, MIN_WINDOW_SPAN, PERCENTILE_STOPS,
};
