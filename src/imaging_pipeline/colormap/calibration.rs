use tracing::info;

use crate::imaging_pipeline::common::{ChannelKind, Result};
use crate::imaging_pipeline::frame::{Frame, MAX_INTENSITY};

/// Intensity added on top of the measured background.
pub const DEFAULT_CALIBRATION_MARGIN: u16 = 2;

/// Low-signal cutoff from one NIR frame of an empty, flat scene.
///
/// Averages the frame without its first row and first column (the sensor
/// reports garbage there on some readouts) and adds `margin`. Frames one
/// pixel wide or tall are averaged whole.
pub fn calibrate_low_cutoff(frame: &Frame, margin: u16) -> Result<u16> {
    frame.expect_channel(ChannelKind::NearInfrared)?;
    let data = frame.as_mono16()?;
    let width = frame.width();
    let height = frame.height();

    let (skip_row, skip_col) = if width > 1 && height > 1 { (1, 1) } else { (0, 0) };
    let mut sum = 0u64;
    let mut count = 0u64;
    for row in data.chunks_exact(width).skip(skip_row) {
        for &value in &row[skip_col..] {
            sum += value.min(MAX_INTENSITY) as u64;
            count += 1;
        }
    }

    let mean = (sum / count) as u16;
    let cutoff = mean.saturating_add(margin).min(MAX_INTENSITY);
    info!(mean, margin, cutoff, "NIR low cutoff calibrated");
    Ok(cutoff)
}
