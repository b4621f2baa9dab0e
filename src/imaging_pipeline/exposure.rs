//! Closed-loop exposure control
//!
//! Nudges each camera's exposure time toward a target percentile cutoff,
//! one bounded step per completed display cycle.

pub mod controller;
pub mod types;


pub use controller::{ChannelUpdate, ControlReport, ExposureController, UpdateOutcome};
pub use types::{
    normalize_step_ratio, ExposureBounds, ExposureParams, ExposureState, DEFAULT_MAX_STEP_RATIO,
    DEFAULT_TARGET_CUTOFF,
};
