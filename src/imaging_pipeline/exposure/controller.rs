use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::imaging_pipeline::acquisition::CameraDevice;
use crate::imaging_pipeline::common::{ChannelKind, ChannelSet, PipelineError, Result};
use crate::imaging_pipeline::exposure::types::{ExposureParams, ExposureState};
use crate::imaging_pipeline::frame::Frame;
use crate::imaging_pipeline::histogram::PercentileAnalyzer;

/// What a control step did to one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// New exposure stored and written to the camera
    Applied,
    /// New exposure stored, but the camera rejected the write
    WriteFailed(String),
    /// No valid pixel, cutoff undefined; exposure untouched this cycle
    SkippedNoSignal,
    /// Channel is terminal; no write issued
    SkippedDisconnected,
    /// A frame was supplied for a channel this controller does not drive
    NotControlled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelUpdate {
    pub channel: ChannelKind,
    pub cutoff: Option<u16>,
    /// Multiplier after clamping, when one was computed
    pub multiplier: Option<f64>,
    pub exposure: u32,
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlReport {
    pub updates: Vec<ChannelUpdate>,
}

impl ControlReport {
    pub fn get(&self, channel: ChannelKind) -> Option<&ChannelUpdate> {
        self.updates.iter().find(|u| u.channel == channel)
    }
}

struct ControlledChannel {
    state: ExposureState,
    device: Arc<dyn CameraDevice>,
    active: bool,
}

/// Discrete-time exposure feedback loop for one or two cameras.
///
/// Each step measures the 95th-percentile intensity of the latest frames,
/// scales the exposure by `1 - (cutoff - target) / target` limited to the
/// channel's step ratio, clamps to the channel's absolute bounds and writes
/// the result to the camera. The same code drives joint and single-camera
/// rigs; joint rigs share the white-light mask between both histograms.
pub struct ExposureController {
    analyzer: PercentileAnalyzer,
    target_cutoff: f64,
    channels: ChannelSet<ControlledChannel>,
}

impl ExposureController {
    pub fn new(
        params: &ExposureParams,
        mask_cutoff: u16,
        devices: ChannelSet<Arc<dyn CameraDevice>>,
    ) -> Self {
        let channels = devices.map(|kind, device| ControlledChannel {
            state: match kind {
                ChannelKind::WhiteLight => params.white_light,
                ChannelKind::NearInfrared => params.near_infrared,
            },
            device,
            active: true,
        });
        Self {
            analyzer: PercentileAnalyzer::new(mask_cutoff, params.percentile),
            target_cutoff: params.target_cutoff,
            channels,
        }
    }

    pub fn target_cutoff(&self) -> f64 {
        self.target_cutoff
    }

    pub fn controlled_channels(&self) -> Vec<ChannelKind> {
        self.channels.kinds()
    }

    pub fn state(&self, channel: ChannelKind) -> Option<&ExposureState> {
        self.channels.get(channel).map(|c| &c.state)
    }

    pub fn exposure(&self, channel: ChannelKind) -> Option<u32> {
        self.state(channel).map(|s| s.current())
    }

    pub fn is_active(&self, channel: ChannelKind) -> bool {
        self.channels.get(channel).is_some_and(|c| c.active)
    }

    /// Stops all further exposure writes to a disconnected camera.
    pub fn deactivate(&mut self, channel: ChannelKind) {
        if let Some(controlled) = self.channels.get_mut(channel) {
            if controlled.active {
                info!(channel = %channel, "Exposure control stopped for disconnected camera");
            }
            controlled.active = false;
        }
    }

    /// Unclamped multiplier for a measured cutoff.
    pub fn raw_multiplier(&self, cutoff: u16) -> f64 {
        1.0 - (cutoff as f64 - self.target_cutoff) / self.target_cutoff
    }

    /// Sets an exposure by hand (auto exposure off), clamped into the
    /// channel's bounds, and writes it to the camera.
    pub fn set_manual(&mut self, channel: ChannelKind, value: u32) -> Result<u32> {
        let controlled = self
            .channels
            .get_mut(channel)
            .ok_or(PipelineError::DeviceDisconnected(channel))?;
        if !controlled.active {
            return Err(PipelineError::DeviceDisconnected(channel));
        }
        let applied = controlled.state.set(value);
        if applied != value {
            debug!(channel = %channel, requested = value, applied, "Manual exposure clamped");
        }
        controlled.device.set_exposure(channel, applied)?;
        Ok(applied)
    }

    /// Runs one control cycle over the latest frames.
    ///
    /// Recoverable conditions never abort the step: channels without valid
    /// pixels are skipped, out-of-range values are clamped and failed camera
    /// writes are logged. Only frames that cannot be analyzed at all (raw
    /// Bayer data) produce an error.
    pub fn step(&mut self, frames: ChannelSet<&Frame>) -> Result<ControlReport> {
        let cutoffs = self.analyzer.cutoffs(frames)?;
        let mut report = ControlReport::default();

        for (channel, &cutoff) in cutoffs.iter() {
            let multiplier = cutoff.map(|c| self.raw_multiplier(c));
            let Some(controlled) = self.channels.get_mut(channel) else {
                report.updates.push(ChannelUpdate {
                    channel,
                    cutoff,
                    multiplier: None,
                    exposure: 0,
                    outcome: UpdateOutcome::NotControlled,
                });
                continue;
            };

            let mut update = ChannelUpdate {
                channel,
                cutoff,
                multiplier: None,
                exposure: controlled.state.current(),
                outcome: UpdateOutcome::SkippedDisconnected,
            };

            if !controlled.active {
                report.updates.push(update);
                continue;
            }

            let Some(raw) = multiplier else {
                warn!(channel = %channel, "No valid pixels for exposure analysis, skipping cycle");
                update.outcome = UpdateOutcome::SkippedNoSignal;
                report.updates.push(update);
                continue;
            };

            let clamped = controlled.state.clamp_multiplier(raw);
            let previous = controlled.state.current();
            let exposure = controlled.state.apply_multiplier(clamped);
            debug!(
                channel = %channel,
                cutoff = ?cutoff,
                raw_multiplier = raw,
                multiplier = clamped,
                previous,
                exposure,
                "Exposure step"
            );

            update.multiplier = Some(clamped);
            update.exposure = exposure;
            update.outcome = match controlled.device.set_exposure(channel, exposure) {
                Ok(()) => UpdateOutcome::Applied,
                Err(e) => {
                    warn!(channel = %channel, exposure, error = %e, "Exposure write failed");
                    UpdateOutcome::WriteFailed(e.to_string())
                }
            };
            report.updates.push(update);
        }

        Ok(report)
    }
}
