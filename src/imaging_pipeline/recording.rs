//! Recording of displayed streams
//!
//! The pipeline decides how many times each frame is written so that the
//! stream plays back at a fixed rate no matter how long the exposure was;
//! the container format belongs to the `VideoEncoder` behind it.

mod encoder;
mod recorder;
mod tiff_stack;
pub mod types;


pub use encoder::VideoEncoder;
pub use recorder::FrameRecorder;
pub use tiff_stack::TiffStackEncoder;
pub use types::{RecordingPolicy, TiffCompression, DEFAULT_RECORDING_FPS};
