use std::fs::File;
use std::path::{Path, PathBuf};

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tracing::{debug, info};

use crate::imaging_pipeline::common::{PipelineError, Result};
use crate::imaging_pipeline::frame::{Frame, PixelData};
use crate::imaging_pipeline::recording::encoder::VideoEncoder;
use crate::imaging_pipeline::recording::types::TiffCompression;

/// Writes every frame as one page of a multi-page TIFF.
///
/// RGB frames become `RGB8` pages, NIR frames `Gray16` and raw Bayer
/// frames `Gray8`.
pub struct TiffStackEncoder {
    path: PathBuf,
    encoder: Option<TiffEncoder<File>>,
    pages: u64,
}

impl TiffStackEncoder {
    pub fn create(path: impl AsRef<Path>, compression: TiffCompression) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let encoder = TiffEncoder::new(file)
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression_of(compression));
        info!(path = %path.display(), ?compression, "Recording started");
        Ok(Self {
            path,
            encoder: Some(encoder),
            pages: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }
}

impl VideoEncoder for TiffStackEncoder {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let encoder = self.encoder.as_mut().ok_or(PipelineError::RecorderClosed)?;
        let width = frame.width() as u32;
        let height = frame.height() as u32;

        let written = match frame.pixels() {
            PixelData::Rgb8(data) => encoder.write_image::<colortype::RGB8>(width, height, data),
            PixelData::Mono16(data) => {
                encoder.write_image::<colortype::Gray16>(width, height, data)
            }
            PixelData::Bayer8(data) => encoder.write_image::<colortype::Gray8>(width, height, data),
        };
        written.map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        self.pages += 1;
        debug!(page = self.pages, width, height, "TIFF page written");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.encoder.take().is_some() {
            info!(path = %self.path.display(), pages = self.pages, "Recording closed");
        }
        Ok(())
    }
}

fn compression_of(compression: TiffCompression) -> Compression {
    match compression {
        TiffCompression::None => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
    }
}
