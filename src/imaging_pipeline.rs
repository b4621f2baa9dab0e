//! Adaptive imaging pipeline module
//!
//! This module drives a white-light / near-infrared camera pair: frame
//! acquisition, NIR denoising, closed-loop exposure control, pseudo-color
//! mapping, overlay composition and recording, orchestrated by an
//! imaging session.

pub mod acquisition;
pub mod colormap;
pub mod common;
pub mod compositor;
pub mod config;
pub mod debayer;
pub mod denoise;
pub mod exposure;
pub mod frame;
pub mod histogram;
pub mod recording;
pub mod session;
pub mod timing;

pub use common::{CaptureError, ChannelKind, ChannelSet, PipelineError, Result};

pub use frame::{Frame, PixelData, PixelFormat, INTENSITY_BINS, MAX_INTENSITY};

pub use acquisition::{
    AcquisitionChannel, CameraDevice, CaptureWorker, ChannelEvent, ChannelState, SyntheticCamera,
    SyntheticScene,
};

pub use denoise::{BorderPolicy, MedianFilterConfig, RollingMedianFilter};

pub use histogram::{IntensityHistogram, PercentileAnalyzer, ValidMask};

pub use exposure::{
    ControlReport, ExposureBounds, ExposureController, ExposureParams, ExposureState,
    UpdateOutcome,
};

pub use colormap::{calibrate_low_cutoff, ColorMapper, ColorScheme, ColorThresholds};

pub use compositor::Compositor;

pub use debayer::{BayerPattern, CpuDebayer, DebayerConfig};

pub use recording::{FrameRecorder, RecordingPolicy, TiffCompression, TiffStackEncoder, VideoEncoder};

pub use config::{PipelineConfig, PipelineConfigBuilder};

pub use session::{CycleReport, DisplaySink, DisplayView, ImagingSession, NullDisplay, SessionSummary};

pub use timing::{CycleTimings, Timer};
