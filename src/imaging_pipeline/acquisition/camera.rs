use crate::imaging_pipeline::common::{CaptureError, ChannelKind, Result};
use crate::imaging_pipeline::frame::Frame;

/// Camera collaborator as seen by the pipeline.
///
/// Opening the device, negotiating attributes and starting the stream are
/// the SDK adapter's business; the pipeline only waits for frames and
/// writes exposure times.
pub trait CameraDevice: Send + Sync {
    /// Stable identifier, used in logs.
    fn id(&self) -> &str;

    /// Blocks until the next frame is complete.
    ///
    /// WL cameras deliver `Bayer8` or `Rgb8` frames, NIR cameras `Mono16`.
    fn capture_next_frame(&self) -> std::result::Result<Frame, CaptureError>;

    /// Writes an exposure time in microseconds. Fire-and-forget from the
    /// controller's point of view: failures are logged, not retried.
    fn set_exposure(&self, channel: ChannelKind, value: u32) -> Result<()>;

    /// Wakes a pending `capture_next_frame` during teardown.
    fn interrupt(&self) {}
}
