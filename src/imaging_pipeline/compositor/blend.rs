use crate::imaging_pipeline::common::{ChannelKind, PipelineError, Result};
use crate::imaging_pipeline::frame::{Frame, PixelData};
use crate::imaging_pipeline::histogram::luminance::luminance_8bit;

/// Global alpha of the infrared layer.
pub const DEFAULT_OPACITY: f32 = 0.1;

/// Draws the pseudo-colored NIR frame over the (optionally grayscale) WL
/// frame with one global alpha. NIR pixels in the black band are fully
/// transparent.
#[derive(Debug, Clone)]
pub struct Compositor {
    opacity: f32,
    monochrome: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_OPACITY, false)
    }
}

impl Compositor {
    pub fn new(opacity: f32, monochrome: bool) -> Self {
        let mut compositor = Self {
            opacity: 0.0,
            monochrome,
        };
        compositor.set_opacity(opacity);
        compositor
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Clamped into `[0, 1]`; NaN counts as fully transparent.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn is_monochrome(&self) -> bool {
        self.monochrome
    }

    pub fn set_monochrome(&mut self, monochrome: bool) {
        self.monochrome = monochrome;
    }

    /// Builds a fresh composite from a demosaiced WL frame and a
    /// color-mapped NIR frame of the same size.
    pub fn compose(&self, white_light: &Frame, near_infrared: &Frame) -> Result<Frame> {
        white_light.expect_channel(ChannelKind::WhiteLight)?;
        near_infrared.expect_channel(ChannelKind::NearInfrared)?;
        if !white_light.same_shape(near_infrared) {
            return Err(PipelineError::UnsupportedFormat(format!(
                "overlay needs equal sizes, WL is {}x{} and NIR is {}x{}",
                white_light.width(),
                white_light.height(),
                near_infrared.width(),
                near_infrared.height()
            )));
        }

        let underlay = white_light.as_rgb8()?;
        let overlay = near_infrared.as_rgb8()?;
        let alpha = self.opacity as f64;

        let mut out = Vec::with_capacity(underlay.len());
        for (wl, nir) in underlay.chunks_exact(3).zip(overlay.chunks_exact(3)) {
            let base = if self.monochrome {
                let gray = luminance_8bit(wl[0], wl[1], wl[2]).round().min(255.0) as u8;
                [gray; 3]
            } else {
                [wl[0], wl[1], wl[2]]
            };

            if nir.iter().all(|&c| c == 0) {
                out.extend_from_slice(&base);
                continue;
            }
            for c in 0..3 {
                let blended = base[c] as f64 * (1.0 - alpha) + nir[c] as f64 * alpha;
                out.push(blended.round().clamp(0.0, 255.0) as u8);
            }
        }

        Frame::new(
            white_light.width(),
            white_light.height(),
            ChannelKind::WhiteLight,
            white_light.sequence_id().max(near_infrared.sequence_id()),
            PixelData::Rgb8(out),
        )
    }
}
