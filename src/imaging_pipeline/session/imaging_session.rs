use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, debug_span, error, info, instrument, warn};

use crate::imaging_pipeline::acquisition::{
    event_mailbox, AcquisitionChannel, CameraDevice, CaptureWorker, ChannelEvent, ChannelState,
};
use crate::imaging_pipeline::colormap::{calibrate_low_cutoff, ColorMapper, ColorScheme};
use crate::imaging_pipeline::common::{ChannelKind, ChannelSet, PipelineError, Result};
use crate::imaging_pipeline::compositor::Compositor;
use crate::imaging_pipeline::config::PipelineConfig;
use crate::imaging_pipeline::debayer::CpuDebayer;
use crate::imaging_pipeline::exposure::ExposureController;
use crate::imaging_pipeline::frame::Frame;
use crate::imaging_pipeline::recording::{FrameRecorder, RecordingPolicy, VideoEncoder};
use crate::imaging_pipeline::session::types::{
    CycleReport, DisplaySink, DisplayView, SessionSummary,
};
use crate::imaging_pipeline::timing::CycleTimings;

/// Longest wait for a notification inside `run` before re-checking the
/// channel states.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Frames gathered since the last completed cycle.
#[derive(Default)]
struct PendingCycle {
    /// Demosaiced, mirrored RGB
    white_light: Option<Frame>,
    /// Denoised intensities and their pseudo-color rendering
    near_infrared: Option<(Arc<Frame>, Frame)>,
}

impl PendingCycle {
    fn has(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::WhiteLight => self.white_light.is_some(),
            ChannelKind::NearInfrared => self.near_infrared.is_some(),
        }
    }
}

/// Consumer context of a one- or two-camera rig.
///
/// A display cycle completes once every live channel has delivered a new
/// frame. Joint rigs then compose and show the overlay; the exposure loop
/// runs on the frames of that cycle when auto exposure is on.
pub struct ImagingSession<D: DisplaySink> {
    config: PipelineConfig,
    channels: ChannelSet<Arc<AcquisitionChannel>>,
    last_sequence: ChannelSet<u64>,
    workers: Vec<CaptureWorker>,
    events: Receiver<ChannelEvent>,
    controller: ExposureController,
    debayer: CpuDebayer,
    mapper: ColorMapper,
    compositor: Compositor,
    display: D,
    recorders: Vec<(DisplayView, FrameRecorder<Box<dyn VideoEncoder>>)>,
    pending: PendingCycle,
    latest_nir: Option<Arc<Frame>>,
    timings: CycleTimings,
    cycles: u64,
    shut_down: bool,
}

impl<D: DisplaySink> ImagingSession<D> {
    /// Writes the initial exposures and starts one capture thread per
    /// camera.
    pub fn start(
        config: PipelineConfig,
        devices: ChannelSet<Arc<dyn CameraDevice>>,
        display: D,
    ) -> Result<Self> {
        let (sender, events) = event_mailbox();
        let channels = devices
            .as_ref()
            .map(|kind, _| Arc::new(AcquisitionChannel::new(kind, sender.clone())));

        let mut controller =
            ExposureController::new(&config.exposure, config.mask_cutoff, devices.clone());
        for kind in controller.controlled_channels() {
            let initial = controller.exposure(kind).unwrap_or_default();
            if let Err(e) = controller.set_manual(kind, initial) {
                warn!(channel = %kind, error = %e, "Initial exposure write failed");
            }
        }

        let mut workers = Vec::new();
        for (kind, channel) in channels.iter() {
            let device = devices
                .get(kind)
                .cloned()
                .ok_or(PipelineError::DeviceDisconnected(kind))?;
            let denoise = (kind == ChannelKind::NearInfrared).then_some(config.median);
            workers.push(CaptureWorker::spawn(device, Arc::clone(channel), denoise)?);
        }

        info!(
            channels = ?channels.kinds(),
            auto_expose = config.auto_expose,
            scheme = ?config.color_scheme,
            "Imaging session started"
        );

        Ok(Self {
            last_sequence: channels.as_ref().map(|_, _| 0),
            channels,
            workers,
            events,
            controller,
            debayer: CpuDebayer::new(config.debayer),
            mapper: ColorMapper::new(config.color_scheme),
            compositor: Compositor::new(config.opacity, config.monochrome_overlay),
            display,
            recorders: Vec::new(),
            pending: PendingCycle::default(),
            latest_nir: None,
            timings: CycleTimings::new(),
            cycles: 0,
            shut_down: false,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn controller(&self) -> &ExposureController {
        &self.controller
    }

    pub fn mapper(&self) -> &ColorMapper {
        &self.mapper
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn channel_state(&self, kind: ChannelKind) -> Option<ChannelState> {
        self.channels.get(kind).map(|c| c.state())
    }

    /// True once no channel can deliver another frame.
    pub fn all_terminal(&self) -> bool {
        self.channels.iter().all(|(_, channel)| !channel.is_live())
    }

    pub fn set_auto_expose(&mut self, enable: bool) {
        self.config.auto_expose = enable;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.compositor.set_opacity(opacity);
        self.config.opacity = self.compositor.opacity();
    }

    pub fn set_monochrome_overlay(&mut self, enable: bool) {
        self.compositor.set_monochrome(enable);
        self.config.monochrome_overlay = enable;
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.mapper.set_scheme(scheme);
        self.config.color_scheme = self.mapper.scheme();
    }

    /// Manual exposure, clamped into the channel bounds and written.
    pub fn set_exposure(&mut self, kind: ChannelKind, value: u32) -> Result<u32> {
        self.controller.set_manual(kind, value)
    }

    /// Derives the percentile scheme's low cutoff from the latest NIR frame
    /// (an empty, flat scene is expected in front of the scope).
    pub fn calibrate(&mut self, margin: u16) -> Result<u16> {
        let frame = self
            .latest_nir
            .clone()
            .or_else(|| {
                self.channels
                    .get(ChannelKind::NearInfrared)
                    .and_then(|c| c.latest())
            })
            .ok_or(PipelineError::NoFrame(ChannelKind::NearInfrared))?;
        let cutoff = calibrate_low_cutoff(&frame, margin)?;
        self.set_color_scheme(ColorScheme::percentile_split(cutoff));
        Ok(cutoff)
    }

    /// Records `view` through `encoder` from the next frame on. An existing
    /// recorder for the view is closed first.
    pub fn start_recording(&mut self, view: DisplayView, encoder: Box<dyn VideoEncoder>) -> Result<()> {
        self.stop_recording(view)?;
        let policy = RecordingPolicy::new(self.config.recording_fps);
        self.recorders.push((view, FrameRecorder::new(encoder, policy)));
        info!(?view, fps = policy.fps, "Recording view");
        Ok(())
    }

    pub fn stop_recording(&mut self, view: DisplayView) -> Result<()> {
        let mut result = Ok(());
        for (_, recorder) in self.recorders.iter_mut().filter(|(v, _)| *v == view) {
            if let Err(e) = recorder.close() {
                result = Err(e);
            }
        }
        self.recorders.retain(|(v, _)| *v != view);
        result
    }

    pub fn is_recording(&self, view: DisplayView) -> bool {
        self.recorders.iter().any(|(v, _)| *v == view)
    }

    /// Processes notifications until one display cycle completes.
    ///
    /// Returns `None` when `timeout` passes first or when every channel is
    /// terminal.
    pub fn run_cycle(&mut self, timeout: Duration) -> Result<Option<CycleReport>> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.all_terminal() {
                self.poll_channel_states();
                return Ok(None);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    if let Some(report) = self.handle_event(event)? {
                        return Ok(Some(report));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.poll_channel_states();
                    return Ok(self.try_complete_cycle());
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }

    /// Runs until `max_cycles` display cycles completed or every channel
    /// went terminal.
    pub fn run(&mut self, max_cycles: u64) -> Result<SessionSummary> {
        let mut completed = 0;
        while completed < max_cycles {
            match self.run_cycle(IDLE_WAIT)? {
                Some(_) => completed += 1,
                None if self.all_terminal() => {
                    info!(cycles = self.cycles, "All channels terminal, session ending");
                    break;
                }
                None => debug!("No frame within the idle wait"),
            }
        }
        Ok(self.summary())
    }

    /// Applies one notification. The payload is only a hint: the frame is
    /// read from the channel's latest slot, so coalesced notifications lose
    /// nothing and stale ones are ignored.
    pub fn handle_event(&mut self, event: ChannelEvent) -> Result<Option<CycleReport>> {
        self.poll_channel_states();
        match event {
            ChannelEvent::FrameReady { channel, .. } => self.take_latest(channel),
            ChannelEvent::Disconnected(kind) => {
                debug!(channel = %kind, "Disconnect notification received");
            }
        }
        Ok(self.try_complete_cycle())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            cycles: self.cycles,
            exposures: self
                .controller
                .controlled_channels()
                .into_iter()
                .filter_map(|kind| self.controller.exposure(kind).map(|e| (kind, e)))
                .collect(),
            channel_states: self
                .channels
                .iter()
                .map(|(kind, channel)| (kind, channel.state()))
                .collect(),
        }
    }

    /// Stops and joins the capture threads, closes the channels, then
    /// closes every recorder. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        for worker in self.workers.iter_mut() {
            worker.stop();
        }
        self.workers.clear();
        for (_, channel) in self.channels.iter() {
            channel.close();
        }

        let mut result = Ok(());
        for (view, recorder) in self.recorders.iter_mut() {
            if let Err(e) = recorder.close() {
                error!(?view, error = %e, "Failed to close recorder");
                result = Err(e);
            }
        }
        self.recorders.clear();

        info!(cycles = self.cycles, "Imaging session shut down");
        result
    }

    fn poll_channel_states(&mut self) {
        for (kind, channel) in self.channels.iter() {
            if !channel.is_live() && self.controller.is_active(kind) {
                warn!(channel = %kind, state = ?channel.state(), "Channel terminal, exposure writes stopped");
                self.controller.deactivate(kind);
            }
        }
    }

    fn take_latest(&mut self, kind: ChannelKind) {
        let Some(frame) = self.channels.get(kind).and_then(|c| c.latest()) else {
            return;
        };
        let Some(seen) = self.last_sequence.get_mut(kind) else {
            return;
        };
        if frame.sequence_id() <= *seen {
            return;
        }
        *seen = frame.sequence_id();

        match kind {
            ChannelKind::WhiteLight => self.process_white_light(&frame),
            ChannelKind::NearInfrared => self.process_near_infrared(frame),
        }
    }

    fn process_white_light(&mut self, frame: &Frame) {
        let _span = debug_span!("white_light", sequence_id = frame.sequence_id()).entered();
        let rgb = match self.timings.time("debayer", || self.debayer.process(frame)) {
            Ok(rgb) => rgb,
            Err(e) => {
                warn!(error = %e, "Dropping WL frame");
                return;
            }
        };

        self.display.show(DisplayView::WhiteLight, &rgb);
        let exposure = self.exposure_of(ChannelKind::WhiteLight);
        self.record(DisplayView::WhiteLight, &rgb, exposure);
        self.pending.white_light = Some(rgb);
    }

    fn process_near_infrared(&mut self, frame: Arc<Frame>) {
        let _span = debug_span!("near_infrared", sequence_id = frame.sequence_id()).entered();
        let (colored, thresholds) = match self.timings.time("colorize", || self.mapper.colorize(&frame)) {
            Ok(mapped) => mapped,
            Err(e) => {
                warn!(error = %e, "Dropping NIR frame");
                return;
            }
        };
        debug!(edges = ?thresholds.edges(), "NIR colorized");

        self.display.show(DisplayView::NearInfrared, &colored);
        let exposure = self.exposure_of(ChannelKind::NearInfrared);
        self.record(DisplayView::NearInfrared, &colored, exposure);
        self.latest_nir = Some(Arc::clone(&frame));
        self.pending.near_infrared = Some((frame, colored));
    }

    fn try_complete_cycle(&mut self) -> Option<CycleReport> {
        let mut any = false;
        for (kind, channel) in self.channels.iter() {
            if self.pending.has(kind) {
                any = true;
            } else if channel.is_live() {
                return None;
            }
        }
        any.then(|| self.complete_cycle())
    }

    #[instrument(skip(self), fields(cycle = self.cycles + 1))]
    fn complete_cycle(&mut self) -> CycleReport {
        let pending = std::mem::take(&mut self.pending);
        self.cycles += 1;

        let mut overlay = false;
        if let (Some(wl), Some((_, colored))) = (&pending.white_light, &pending.near_infrared) {
            match self.timings.time("overlay", || self.compositor.compose(wl, colored)) {
                Ok(composite) => {
                    self.display.show(DisplayView::Overlay, &composite);
                    let exposure = self
                        .exposure_of(ChannelKind::WhiteLight)
                        .min(self.exposure_of(ChannelKind::NearInfrared));
                    self.record(DisplayView::Overlay, &composite, exposure);
                    overlay = true;
                }
                Err(e) => warn!(error = %e, "Overlay skipped"),
            }
        }

        let control = if self.config.auto_expose {
            let frames = ChannelSet::from_options(
                pending.white_light.as_ref(),
                pending.near_infrared.as_ref().map(|(raw, _)| raw.as_ref()),
            );
            frames.and_then(|frames| {
                match self.timings.time("exposure", || self.controller.step(frames)) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!(error = %e, "Exposure step failed");
                        None
                    }
                }
            })
        } else {
            None
        };

        let timings = std::mem::take(&mut self.timings);
        timings.log_summary(self.cycles);
        CycleReport {
            cycle: self.cycles,
            overlay,
            control,
            timings,
        }
    }

    fn exposure_of(&self, kind: ChannelKind) -> u32 {
        self.controller.exposure(kind).unwrap_or_default()
    }

    fn record(&mut self, view: DisplayView, frame: &Frame, exposure_us: u32) {
        for (_, recorder) in self.recorders.iter_mut().filter(|(v, _)| *v == view) {
            if let Err(e) = recorder.record(frame, exposure_us) {
                warn!(?view, error = %e, "Recording write failed");
            }
        }
    }
}

impl<D: DisplaySink> Drop for ImagingSession<D> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(error = %e, "Session shutdown incomplete");
        }
    }
}
