use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::imaging_pipeline::acquisition::camera::CameraDevice;
use crate::imaging_pipeline::acquisition::channel::AcquisitionChannel;
use crate::imaging_pipeline::common::{CaptureError, Result};
use crate::imaging_pipeline::denoise::{MedianFilterConfig, RollingMedianFilter};
use crate::imaging_pipeline::frame::PixelFormat;

/// Owns the capture thread of one camera.
pub struct CaptureWorker {
    channel: Arc<AcquisitionChannel>,
    device: Arc<dyn CameraDevice>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Starts the blocking capture loop on a dedicated thread.
    ///
    /// When `denoise` is set and enabled, Mono16 frames are median filtered
    /// on the capture thread, while the frame is still privately owned,
    /// before they are published.
    pub fn spawn(
        device: Arc<dyn CameraDevice>,
        channel: Arc<AcquisitionChannel>,
        denoise: Option<MedianFilterConfig>,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_name = format!("capture-{}", channel.kind().label().to_lowercase());

        let loop_device = Arc::clone(&device);
        let loop_channel = Arc::clone(&channel);
        let loop_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || capture_loop(loop_device, loop_channel, loop_stop, denoise))?;

        Ok(Self {
            channel,
            device,
            stop,
            handle: Some(handle),
        })
    }

    pub fn channel(&self) -> &Arc<AcquisitionChannel> {
        &self.channel
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stops the loop and waits for the thread to exit. A frame completed
    /// after this call is never published.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.device.interrupt();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(channel = %self.channel.kind(), "Capture thread panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(
    device: Arc<dyn CameraDevice>,
    channel: Arc<AcquisitionChannel>,
    stop: Arc<AtomicBool>,
    denoise: Option<MedianFilterConfig>,
) {
    let kind = channel.kind();
    let mut filter = denoise
        .filter(|config| config.enabled)
        .map(RollingMedianFilter::new);
    info!(channel = %kind, device = device.id(), "Capture loop started");

    while !stop.load(Ordering::Acquire) {
        match device.capture_next_frame() {
            Ok(mut frame) => {
                if stop.load(Ordering::Acquire) {
                    debug!(channel = %kind, "Dropping frame completed after stop");
                    break;
                }
                if let Err(e) = frame.expect_channel(kind) {
                    warn!(channel = %kind, error = %e, "Discarding frame from wrong channel");
                    continue;
                }
                if let Some(filter) = filter.as_mut() {
                    if frame.format() == PixelFormat::Mono16 {
                        if let Err(e) = filter.apply(&mut frame) {
                            warn!(channel = %kind, error = %e, "Median filter failed");
                        }
                    }
                }
                if !channel.submit(frame) {
                    break;
                }
            }
            Err(CaptureError::Transient(reason)) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                warn!(channel = %kind, %reason, "Frame dropped, re-queueing");
            }
            Err(CaptureError::Disconnected) => {
                error!(channel = %kind, device = device.id(), "Camera unplugged");
                channel.mark_disconnected();
                break;
            }
        }
    }

    info!(channel = %kind, "Capture loop stopped");
}
