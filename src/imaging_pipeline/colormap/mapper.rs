use tracing::debug;

use crate::imaging_pipeline::colormap::thresholds::{ColorScheme, ColorThresholds};
use crate::imaging_pipeline::common::{ChannelKind, Result};
use crate::imaging_pipeline::frame::{Frame, PixelData};
use crate::imaging_pipeline::histogram::{IntensityHistogram, ValidMask};

/// Converts denoised NIR frames into pseudo-color RGB frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMapper {
    scheme: ColorScheme,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

impl ColorMapper {
    pub fn new(scheme: ColorScheme) -> Self {
        let scheme = match scheme {
            ColorScheme::EvenSplit { min_val, max_val } => ColorScheme::even_split(min_val, max_val),
            ColorScheme::PercentileSplit { low_cutoff } => ColorScheme::percentile_split(low_cutoff),
        };
        Self { scheme }
    }

    pub fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// User override of the scheme or its window.
    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        *self = Self::new(scheme);
    }

    /// Installs a calibrated low cutoff, switching to the percentile scheme.
    pub fn set_low_cutoff(&mut self, low_cutoff: u16) {
        self.set_scheme(ColorScheme::percentile_split(low_cutoff));
    }

    /// Band edges for one frame. Even-split edges do not depend on the
    /// frame; percentile edges come from the pixels above the low cutoff.
    pub fn thresholds_for(&self, frame: &Frame) -> Result<ColorThresholds> {
        match self.scheme {
            ColorScheme::EvenSplit { min_val, max_val } => {
                Ok(ColorThresholds::even_split(min_val, max_val))
            }
            ColorScheme::PercentileSplit { low_cutoff } => {
                let plane = frame.as_mono16()?;
                let histogram = if low_cutoff == 0 {
                    // a zero cutoff disables ValidMask, rebuild the strict mask by hand
                    let mut histogram = IntensityHistogram::new();
                    plane.iter().filter(|&&v| v > 0).for_each(|&v| histogram.add(v));
                    histogram
                } else {
                    IntensityHistogram::from_masked(plane, &ValidMask::from_plane(plane, low_cutoff))
                };
                let thresholds = ColorThresholds::percentile_split(low_cutoff, &histogram);
                debug!(edges = ?thresholds.edges(), above_cutoff = histogram.total(), "Percentile thresholds");
                Ok(thresholds)
            }
        }
    }

    /// Colors every pixel with the given edges.
    pub fn map_with(&self, thresholds: &ColorThresholds, frame: &Frame) -> Result<Frame> {
        frame.expect_channel(ChannelKind::NearInfrared)?;
        let plane = frame.as_mono16()?;
        let mut rgb = Vec::with_capacity(plane.len() * 3);
        for &value in plane {
            rgb.extend_from_slice(&thresholds.color_of(value));
        }
        Frame::new(
            frame.width(),
            frame.height(),
            ChannelKind::NearInfrared,
            frame.sequence_id(),
            PixelData::Rgb8(rgb),
        )
    }

    /// Thresholds and pseudo-color frame in one pass.
    pub fn colorize(&self, frame: &Frame) -> Result<(Frame, ColorThresholds)> {
        let thresholds = self.thresholds_for(frame)?;
        let colored = self.map_with(&thresholds, frame)?;
        Ok((colored, thresholds))
    }
}
