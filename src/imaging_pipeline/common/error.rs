use thiserror::Error;

use crate::imaging_pipeline::common::channel::ChannelKind;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Buffer length mismatch: expected {expected} samples, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("Frame belongs to the {actual} channel, expected {expected}")]
    ChannelMismatch {
        expected: ChannelKind,
        actual: ChannelKind,
    },

    #[error("{0} camera disconnected")]
    DeviceDisconnected(ChannelKind),

    #[error("No {0} frame received yet")]
    NoFrame(ChannelKind),

    #[error("Failed to write exposure to {channel} camera: {reason}")]
    ExposureWrite { channel: ChannelKind, reason: String },

    #[error("Demosaic failed: {0}")]
    DebayerError(String),

    #[error("Failed to encode frame: {0}")]
    EncodeError(String),

    #[error("Recorder already closed")]
    RecorderClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Outcome of a failed blocking capture, reported by the camera collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Permanent: the device is gone and the channel must go terminal.
    #[error("device unplugged")]
    Disconnected,

    /// The frame was dropped; the capture loop re-queues and waits again.
    #[error("transient capture failure: {0}")]
    Transient(String),
}
