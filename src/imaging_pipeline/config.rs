//! Pipeline configuration

use crate::imaging_pipeline::colormap::ColorScheme;
use crate::imaging_pipeline::compositor::DEFAULT_OPACITY;
use crate::imaging_pipeline::debayer::DebayerConfig;
use crate::imaging_pipeline::denoise::MedianFilterConfig;
use crate::imaging_pipeline::exposure::ExposureParams;
use crate::imaging_pipeline::recording::DEFAULT_RECORDING_FPS;

/// Settings read by the imaging session. Values set through the builder
/// are normalized in `build()`: opacity clamped into `[0, 1]`, narrow
/// even-split windows widened.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Run the exposure loop once per display cycle
    pub auto_expose: bool,
    /// Luminance at or below which a pixel is masked out of analysis
    pub mask_cutoff: u16,
    /// Global alpha of the NIR overlay
    pub opacity: f32,
    /// Gray WL underlay in the overlay view
    pub monochrome_overlay: bool,
    pub color_scheme: ColorScheme,
    pub exposure: ExposureParams,
    pub median: MedianFilterConfig,
    pub debayer: DebayerConfig,
    /// Playback rate of recordings
    pub recording_fps: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_expose: true,
            mask_cutoff: 32,
            opacity: DEFAULT_OPACITY,
            monochrome_overlay: false,
            color_scheme: ColorScheme::default(),
            exposure: ExposureParams::default(),
            median: MedianFilterConfig::default(),
            debayer: DebayerConfig::default(),
            recording_fps: DEFAULT_RECORDING_FPS,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    auto_expose: Option<bool>,
    mask_cutoff: Option<u16>,
    opacity: Option<f32>,
    monochrome_overlay: Option<bool>,
    color_scheme: Option<ColorScheme>,
    exposure: Option<ExposureParams>,
    median: Option<MedianFilterConfig>,
    debayer: Option<DebayerConfig>,
    recording_fps: Option<f64>,
}

impl PipelineConfigBuilder {
    pub fn auto_expose(mut self, enable: bool) -> Self {
        self.auto_expose = Some(enable);
        self
    }

    pub fn mask_cutoff(mut self, cutoff: u16) -> Self {
        self.mask_cutoff = Some(cutoff);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn monochrome_overlay(mut self, enable: bool) -> Self {
        self.monochrome_overlay = Some(enable);
        self
    }

    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = Some(scheme);
        self
    }

    pub fn exposure(mut self, params: ExposureParams) -> Self {
        self.exposure = Some(params);
        self
    }

    pub fn median(mut self, config: MedianFilterConfig) -> Self {
        self.median = Some(config);
        self
    }

    pub fn debayer(mut self, config: DebayerConfig) -> Self {
        self.debayer = Some(config);
        self
    }

    pub fn recording_fps(mut self, fps: f64) -> Self {
        self.recording_fps = Some(fps);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        let opacity = self.opacity.unwrap_or(default.opacity);
        let color_scheme = match self.color_scheme.unwrap_or(default.color_scheme) {
            ColorScheme::EvenSplit { min_val, max_val } => ColorScheme::even_split(min_val, max_val),
            ColorScheme::PercentileSplit { low_cutoff } => ColorScheme::percentile_split(low_cutoff),
        };
        PipelineConfig {
            auto_expose: self.auto_expose.unwrap_or(default.auto_expose),
            mask_cutoff: self.mask_cutoff.unwrap_or(default.mask_cutoff),
            opacity: if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) },
            monochrome_overlay: self.monochrome_overlay.unwrap_or(default.monochrome_overlay),
            color_scheme,
            exposure: self.exposure.unwrap_or(default.exposure),
            median: self.median.unwrap_or(default.median),
            debayer: self.debayer.unwrap_or(default.debayer),
            recording_fps: self.recording_fps.unwrap_or(default.recording_fps),
        }
    }
}
