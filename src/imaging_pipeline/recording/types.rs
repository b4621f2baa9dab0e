//! Recording configuration types

/// Playback rate the repetition policy targets.
pub const DEFAULT_RECORDING_FPS: f64 = 24.0;

/// How many encoder writes one displayed frame is worth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingPolicy {
    pub fps: f64,
}

impl Default for RecordingPolicy {
    fn default() -> Self {
        Self {
            fps: DEFAULT_RECORDING_FPS,
        }
    }
}

impl RecordingPolicy {
    pub fn new(fps: f64) -> Self {
        Self {
            fps: if fps.is_finite() { fps.max(0.0) } else { DEFAULT_RECORDING_FPS },
        }
    }

    /// `floor(exposure_seconds * fps + 1)`: at least one write, plus one
    /// per playback frame the exposure spans.
    pub fn repeats_for(&self, exposure_us: u32) -> usize {
        let seconds = exposure_us as f64 / 1_000_000.0;
        (seconds * self.fps + 1.0).floor() as usize
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}
