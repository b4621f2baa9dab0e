use crate::imaging_pipeline::common::Result;
use crate::imaging_pipeline::frame::Frame;

/// Sink for recorded frames.
pub trait VideoEncoder: Send {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Finalizes the output. Called once; later writes are refused by the
    /// recorder before they reach the encoder.
    fn close(&mut self) -> Result<()>;
}

impl<E: VideoEncoder + ?Sized> VideoEncoder for Box<E> {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
