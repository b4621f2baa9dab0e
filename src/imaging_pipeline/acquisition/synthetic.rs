//! In-process camera for demos and tests.
//!
//! Produces frames whose brightness is proportional to the exposure last
//! written, so the exposure loop can be watched converging without
//! hardware.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::imaging_pipeline::acquisition::camera::CameraDevice;
use crate::imaging_pipeline::common::{CaptureError, ChannelKind, PipelineError, Result};
use crate::imaging_pipeline::frame::{Frame, PixelData, MAX_INTENSITY};

const WAIT_SLICE: Duration = Duration::from_millis(2);

/// What the synthetic sensor sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticScene {
    /// Sensor counts per microsecond of exposure
    pub counts_per_us: f64,
    /// Black out everything outside a centered circle, like an endoscope
    pub circular_field: bool,
    /// Peak-to-peak amplitude of the deterministic speckle noise
    pub noise: u16,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            counts_per_us: 0.004,
            circular_field: true,
            noise: 0,
        }
    }
}

pub struct SyntheticCamera {
    id: String,
    kind: ChannelKind,
    width: usize,
    height: usize,
    scene: SyntheticScene,
    frame_interval: Duration,
    exposure: AtomicU32,
    captured: AtomicU64,
    disconnect_after: Option<u64>,
    interrupted: AtomicBool,
    reject_writes: AtomicBool,
    writes: Mutex<Vec<u32>>,
}

impl SyntheticCamera {
    pub fn new(kind: ChannelKind, width: usize, height: usize, exposure: u32) -> Self {
        Self {
            id: format!("synthetic-{}", kind.label().to_lowercase()),
            kind,
            width,
            height,
            scene: SyntheticScene::default(),
            frame_interval: Duration::from_millis(5),
            exposure: AtomicU32::new(exposure),
            captured: AtomicU64::new(0),
            disconnect_after: None,
            interrupted: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scene(mut self, scene: SyntheticScene) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Reports an unplug instead of frame number `frames + 1`.
    pub fn disconnect_after(mut self, frames: u64) -> Self {
        self.disconnect_after = Some(frames);
        self
    }

    /// Makes every exposure write fail, as a flaky attribute bus would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Release);
    }

    pub fn exposure(&self) -> u32 {
        self.exposure.load(Ordering::Acquire)
    }

    /// Every exposure value written so far, in order.
    pub fn exposure_writes(&self) -> Vec<u32> {
        self.writes.lock().clone()
    }

    pub fn frames_captured(&self) -> u64 {
        self.captured.load(Ordering::Acquire)
    }

    /// Renders the frame the sensor would produce at the current exposure.
    pub fn render(&self, sequence: u64) -> Result<Frame> {
        let level = (self.exposure() as f64 * self.scene.counts_per_us).round();
        let cx = (self.width as f64 - 1.0) / 2.0;
        let cy = (self.height as f64 - 1.0) / 2.0;
        let radius = self.width.min(self.height) as f64 / 2.0;
        let mut noise_state = (sequence as u32).wrapping_mul(2_654_435_761) | 1;

        let mut samples = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let inside = !self.scene.circular_field || (dx * dx + dy * dy).sqrt() <= radius;
                let mut value = if inside { level } else { 0.0 };
                if inside && self.scene.noise > 0 {
                    noise_state ^= noise_state << 13;
                    noise_state ^= noise_state >> 17;
                    noise_state ^= noise_state << 5;
                    let offset = (noise_state % (self.scene.noise as u32 + 1)) as f64;
                    value += offset - self.scene.noise as f64 / 2.0;
                }
                samples.push(value.max(0.0));
            }
        }

        let pixels = match self.kind {
            ChannelKind::NearInfrared => PixelData::Mono16(
                samples
                    .iter()
                    .map(|&v| v.min(MAX_INTENSITY as f64) as u16)
                    .collect(),
            ),
            ChannelKind::WhiteLight => {
                PixelData::Bayer8(samples.iter().map(|&v| v.min(255.0) as u8).collect())
            }
        };
        Frame::new(self.width, self.height, self.kind, sequence, pixels)
    }

    fn wait_interval(&self) -> bool {
        let deadline = Instant::now() + self.frame_interval;
        loop {
            if self.interrupted.load(Ordering::Acquire) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(WAIT_SLICE.min(deadline - now));
        }
    }
}

impl CameraDevice for SyntheticCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture_next_frame(&self) -> std::result::Result<Frame, CaptureError> {
        if !self.wait_interval() {
            return Err(CaptureError::Transient("capture interrupted".to_string()));
        }
        let sequence = self.captured.fetch_add(1, Ordering::AcqRel) + 1;
        if self.disconnect_after.is_some_and(|limit| sequence > limit) {
            return Err(CaptureError::Disconnected);
        }
        self.render(sequence)
            .map_err(|e| CaptureError::Transient(e.to_string()))
    }

    fn set_exposure(&self, channel: ChannelKind, value: u32) -> Result<()> {
        if self.reject_writes.load(Ordering::Acquire) {
            return Err(PipelineError::ExposureWrite {
                channel,
                reason: "attribute write rejected".to_string(),
            });
        }
        self.exposure.store(value, Ordering::Release);
        self.writes.lock().push(value);
        Ok(())
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }
}
