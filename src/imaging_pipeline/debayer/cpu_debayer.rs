use std::io::Cursor;

use bayer::{BayerDepth, Demosaic, RasterDepth, RasterMut};
use tracing::trace;

use crate::imaging_pipeline::common::{ChannelKind, PipelineError, Result};
use crate::imaging_pipeline::debayer::types::DebayerConfig;
use crate::imaging_pipeline::frame::{Frame, PixelData};

/// Bilinear demosaic on the CPU, followed by the optional mirror.
#[derive(Debug, Clone, Default)]
pub struct CpuDebayer {
    config: DebayerConfig,
}

impl CpuDebayer {
    pub fn new(config: DebayerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebayerConfig {
        &self.config
    }

    /// Turns a WL frame into display-ready RGB888.
    ///
    /// `Bayer8` frames are demosaiced; `Rgb8` frames (cameras that debayer
    /// on board) only go through the mirror step.
    pub fn process(&self, frame: &Frame) -> Result<Frame> {
        frame.expect_channel(ChannelKind::WhiteLight)?;
        let width = frame.width();
        let height = frame.height();

        let mut rgb = match frame.pixels() {
            PixelData::Bayer8(mosaic) => self.demosaic(mosaic, width, height)?,
            PixelData::Rgb8(rgb) => rgb.clone(),
            PixelData::Mono16(_) => {
                return Err(PipelineError::UnsupportedFormat(
                    "WL frames must be Bayer8 or Rgb8".to_string(),
                ));
            }
        };

        if self.config.mirror_horizontal {
            mirror_rows(&mut rgb, width);
        }

        Frame::new(
            width,
            height,
            ChannelKind::WhiteLight,
            frame.sequence_id(),
            PixelData::Rgb8(rgb),
        )
    }

    fn demosaic(&self, mosaic: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        trace!(width, height, pattern = ?self.config.pattern, "Running demosaic");

        let mut output_buf = vec![0u8; width * height * 3];
        let mut cursor = Cursor::new(mosaic);
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth8, &mut output_buf);

        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth8,
            self.config.pattern.cfa(),
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| PipelineError::DebayerError(format!("{:?}", e)))?;

        Ok(output_buf)
    }
}

/// Reverses the pixel order of every RGB row in place.
fn mirror_rows(rgb: &mut [u8], width: usize) {
    for row in rgb.chunks_exact_mut(width * 3) {
        for x in 0..width / 2 {
            let mirrored = width - 1 - x;
            for c in 0..3 {
                row.swap(x * 3 + c, mirrored * 3 + c);
            }
        }
    }
}
