//! Consumer side of the rig
//!
//! `ImagingSession` owns the capture workers, reacts to frame-ready
//! notifications, renders every view, records, and closes the exposure
//! loop once per completed display cycle.

mod imaging_session;
pub mod types;


pub use imaging_session::ImagingSession;
pub use types::{CycleReport, DisplaySink, DisplayView, NullDisplay, SessionSummary};
