//! Visible-light luminance in the infrared intensity domain.

use crate::imaging_pipeline::common::{PipelineError, Result};
use crate::imaging_pipeline::frame::{Frame, PixelData, MAX_INTENSITY};

const RED_WEIGHT: f64 = 0.21;
const GREEN_WEIGHT: f64 = 0.72;
const BLUE_WEIGHT: f64 = 0.07;

/// Scale from 8-bit luminance to the 0..4095 domain of the NIR sensor.
const DOMAIN_SCALE: f64 = 16.0;

/// Weighted luminance of one pixel, in 8-bit units (not rounded).
pub(crate) fn luminance_8bit(r: u8, g: u8, b: u8) -> f64 {
    RED_WEIGHT * r as f64 + GREEN_WEIGHT * g as f64 + BLUE_WEIGHT * b as f64
}

/// Luminance of one pixel mapped into the 12-bit domain so WL and NIR
/// histograms are directly comparable.
pub fn luminance_12bit(r: u8, g: u8, b: u8) -> u16 {
    let scaled = (luminance_8bit(r, g, b) * DOMAIN_SCALE).round();
    (scaled as u16).min(MAX_INTENSITY)
}

/// Per-pixel 12-bit luminance of an RGB frame.
pub fn luminance_plane(frame: &Frame) -> Result<Vec<u16>> {
    let rgb = frame.as_rgb8()?;
    Ok(rgb
        .chunks_exact(3)
        .map(|px| luminance_12bit(px[0], px[1], px[2]))
        .collect())
}

/// Per-pixel analysis intensity of any processed frame: luminance for RGB,
/// the raw samples (saturated to 12 bits) for Mono16.
pub fn intensity_plane(frame: &Frame) -> Result<Vec<u16>> {
    match frame.pixels() {
        PixelData::Rgb8(_) => luminance_plane(frame),
        PixelData::Mono16(data) => Ok(data.iter().map(|&v| v.min(MAX_INTENSITY)).collect()),
        PixelData::Bayer8(_) => Err(PipelineError::UnsupportedFormat(
            "Bayer frames must be demosaiced before analysis".to_string(),
        )),
    }
}
