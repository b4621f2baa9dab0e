//! Frame acquisition module
//!
//! Decouples each camera's blocking capture loop from the consumer that
//! processes and displays its frames.

pub mod camera;
pub mod channel;
pub mod synthetic;
pub mod worker;

#[cfg(test)]
mod tests;

pub use camera::CameraDevice;
pub use channel::{event_mailbox, AcquisitionChannel, ChannelEvent, ChannelState, MAILBOX_CAPACITY};
pub use synthetic::{SyntheticCamera, SyntheticScene};
pub use worker::CaptureWorker;
