//! Frame data model
//!
//! Fixed-shape pixel buffers produced by the cameras and by every stage
//! downstream of them.

pub mod types;

pub use types::{Frame, PixelData, PixelFormat, MAX_INTENSITY, INTENSITY_BINS};
