//! Common utilities module
//!
//! Shared error type and the channel identifiers used across the pipeline.

pub mod error;
pub mod channel;

pub use error::{CaptureError, PipelineError, Result};
pub use channel::{ChannelKind, ChannelSet};
