use tracing::debug;

use crate::imaging_pipeline::common::{PipelineError, Result};
use crate::imaging_pipeline::frame::Frame;
use crate::imaging_pipeline::recording::encoder::VideoEncoder;
use crate::imaging_pipeline::recording::types::RecordingPolicy;

/// Applies the repetition policy in front of an encoder.
pub struct FrameRecorder<E: VideoEncoder> {
    encoder: E,
    policy: RecordingPolicy,
    frames_written: u64,
    closed: bool,
}

impl<E: VideoEncoder> FrameRecorder<E> {
    pub fn new(encoder: E, policy: RecordingPolicy) -> Self {
        Self {
            encoder,
            policy,
            frames_written: 0,
            closed: false,
        }
    }

    pub fn policy(&self) -> RecordingPolicy {
        self.policy
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Writes `frame` as many times as its exposure spans at the target
    /// rate and returns the number of writes.
    pub fn record(&mut self, frame: &Frame, exposure_us: u32) -> Result<usize> {
        if self.closed {
            return Err(PipelineError::RecorderClosed);
        }
        let repeats = self.policy.repeats_for(exposure_us);
        for _ in 0..repeats {
            self.encoder.write_frame(frame)?;
            self.frames_written += 1;
        }
        debug!(
            sequence_id = frame.sequence_id(),
            exposure_us, repeats, "Frame recorded"
        );
        Ok(repeats)
    }

    /// Closes the encoder; later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.encoder.close()
    }

    pub fn into_encoder(self) -> E {
        self.encoder
    }
}
