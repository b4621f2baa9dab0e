//! Frame types

use crate::imaging_pipeline::common::{ChannelKind, PipelineError, Result};

/// Number of intensity bins in the 12-bit analysis domain.
pub const INTENSITY_BINS: usize = 4096;

/// Largest intensity of the analysis domain; larger samples saturate here.
pub const MAX_INTENSITY: u16 = (INTENSITY_BINS - 1) as u16;

/// Layout of a frame's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One 8-bit sample per pixel in a Bayer mosaic (raw WL sensor output)
    Bayer8,
    /// Interleaved 8-bit RGB, 3 samples per pixel
    Rgb8,
    /// One 16-bit sample per pixel (raw NIR sensor output)
    Mono16,
}

impl PixelFormat {
    pub fn samples_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bayer8 | PixelFormat::Mono16 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            PixelFormat::Bayer8 | PixelFormat::Rgb8 => 1,
            PixelFormat::Mono16 => 2,
        }
    }
}

/// Owned pixel storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    Bayer8(Vec<u8>),
    Rgb8(Vec<u8>),
    Mono16(Vec<u16>),
}

impl PixelData {
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelData::Bayer8(_) => PixelFormat::Bayer8,
            PixelData::Rgb8(_) => PixelFormat::Rgb8,
            PixelData::Mono16(_) => PixelFormat::Mono16,
        }
    }

    fn len(&self) -> usize {
        match self {
            PixelData::Bayer8(data) | PixelData::Rgb8(data) => data.len(),
            PixelData::Mono16(data) => data.len(),
        }
    }
}

/// One captured (or derived) image.
///
/// The sample count always equals `width * height * samples_per_pixel`;
/// the constructor refuses anything else so downstream loops can index
/// without bounds surprises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    channel: ChannelKind,
    sequence_id: u64,
    pixels: PixelData,
}

impl Frame {
    pub fn new(
        width: usize,
        height: usize,
        channel: ChannelKind,
        sequence_id: u64,
        pixels: PixelData,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        let expected = width * height * pixels.format().samples_per_pixel();
        if pixels.len() != expected {
            return Err(PipelineError::BufferLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channel,
            sequence_id,
            pixels,
        })
    }

    /// A frame filled with one 16-bit intensity.
    pub fn filled_mono16(
        width: usize,
        height: usize,
        channel: ChannelKind,
        value: u16,
    ) -> Result<Self> {
        Self::new(width, height, channel, 0, PixelData::Mono16(vec![value; width * height]))
    }

    /// A frame filled with one RGB color.
    pub fn filled_rgb8(
        width: usize,
        height: usize,
        channel: ChannelKind,
        rgb: [u8; 3],
    ) -> Result<Self> {
        let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
        Self::new(width, height, channel, 0, PixelData::Rgb8(data))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn channel(&self) -> ChannelKind {
        self.channel
    }

    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    pub fn set_sequence_id(&mut self, sequence_id: u64) {
        self.sequence_id = sequence_id;
    }

    pub fn format(&self) -> PixelFormat {
        self.pixels.format()
    }

    /// 8 for visible-light derived buffers, 16 for infrared raw.
    pub fn bit_depth(&self) -> u32 {
        (self.format().bytes_per_sample() * 8) as u32
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format().samples_per_pixel() * self.format().bytes_per_sample()
    }

    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn pixels(&self) -> &PixelData {
        &self.pixels
    }

    pub fn into_pixels(self) -> PixelData {
        self.pixels
    }

    pub fn as_mono16(&self) -> Result<&[u16]> {
        match &self.pixels {
            PixelData::Mono16(data) => Ok(data),
            other => Err(unsupported(other.format(), PixelFormat::Mono16)),
        }
    }

    pub fn as_mono16_mut(&mut self) -> Result<&mut [u16]> {
        match &mut self.pixels {
            PixelData::Mono16(data) => Ok(data),
            other => Err(unsupported(other.format(), PixelFormat::Mono16)),
        }
    }

    pub fn as_rgb8(&self) -> Result<&[u8]> {
        match &self.pixels {
            PixelData::Rgb8(data) => Ok(data),
            other => Err(unsupported(other.format(), PixelFormat::Rgb8)),
        }
    }

    pub fn as_bayer8(&self) -> Result<&[u8]> {
        match &self.pixels {
            PixelData::Bayer8(data) => Ok(data),
            other => Err(unsupported(other.format(), PixelFormat::Bayer8)),
        }
    }

    /// Checks that the frame came from `expected`.
    pub fn expect_channel(&self, expected: ChannelKind) -> Result<()> {
        if self.channel != expected {
            return Err(PipelineError::ChannelMismatch {
                expected,
                actual: self.channel,
            });
        }
        Ok(())
    }
}

fn unsupported(actual: PixelFormat, wanted: PixelFormat) -> PipelineError {
    PipelineError::UnsupportedFormat(format!("expected {:?} frame, got {:?}", wanted, actual))
}
