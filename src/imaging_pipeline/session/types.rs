//! Session types

use crate::imaging_pipeline::acquisition::ChannelState;
use crate::imaging_pipeline::common::ChannelKind;
use crate::imaging_pipeline::exposure::ControlReport;
use crate::imaging_pipeline::frame::Frame;
use crate::imaging_pipeline::timing::CycleTimings;

/// One of the three displayed streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayView {
    WhiteLight,
    NearInfrared,
    Overlay,
}

/// Receives every ready-to-show RGB frame.
pub trait DisplaySink {
    fn show(&mut self, view: DisplayView, frame: &Frame);
}

/// Display that discards everything (headless runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn show(&mut self, _view: DisplayView, _frame: &Frame) {}
}

/// What one completed display cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    /// An overlay frame was composed and shown
    pub overlay: bool,
    /// Present when auto exposure ran this cycle
    pub control: Option<ControlReport>,
    pub timings: CycleTimings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub cycles: u64,
    pub exposures: Vec<(ChannelKind, u32)>,
    pub channel_states: Vec<(ChannelKind, ChannelState)>,
}
