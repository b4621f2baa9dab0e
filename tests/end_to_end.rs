use std::sync::Arc;

use parking_lot::Mutex;

use multichannel_imaging::imaging_pipeline::denoise::sorted_window_median;
use multichannel_imaging::imaging_pipeline::{
    BorderPolicy, CameraDevice, CaptureError, ChannelKind, ChannelSet, ColorMapper, ColorScheme,
    Compositor, CpuDebayer, ExposureController, ExposureParams, Frame, MedianFilterConfig,
    PercentileAnalyzer, PixelData, Result, RollingMedianFilter, UpdateOutcome,
};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Camera stand-in that only records exposure writes.
struct WriteLog {
    writes: Mutex<Vec<u32>>,
}

impl WriteLog {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            writes: Mutex::new(Vec::new()),
        })
    }
}

impl CameraDevice for WriteLog {
    fn id(&self) -> &str {
        "write-log"
    }

    fn capture_next_frame(&self) -> std::result::Result<Frame, CaptureError> {
        Err(CaptureError::Disconnected)
    }

    fn set_exposure(&self, _channel: ChannelKind, value: u32) -> Result<()> {
        self.writes.lock().push(value);
        Ok(())
    }
}

fn joint_controller() -> (ExposureController, Arc<WriteLog>, Arc<WriteLog>) {
    let wl = WriteLog::new();
    let nir = WriteLog::new();
    let devices: ChannelSet<Arc<dyn CameraDevice>> = ChannelSet::Joint {
        white_light: wl.clone(),
        near_infrared: nir.clone(),
    };
    (ExposureController::new(&ExposureParams::default(), 32, devices), wl, nir)
}

fn gray_wl(level: u8) -> Frame {
    Frame::filled_rgb8(WIDTH, HEIGHT, ChannelKind::WhiteLight, [level; 3]).unwrap()
}

#[test]
fn test_on_target_infrared_keeps_its_exposure() {
    let (mut controller, wl_log, nir_log) = joint_controller();
    let wl = gray_wl(128);
    let nir = Frame::filled_mono16(WIDTH, HEIGHT, ChannelKind::NearInfrared, 3000).unwrap();

    let report = controller
        .step(ChannelSet::Joint {
            white_light: &wl,
            near_infrared: &nir,
        })
        .unwrap();

    let nir_update = report.get(ChannelKind::NearInfrared).unwrap();
    assert_eq!(nir_update.cutoff, Some(3000));
    assert_eq!(nir_update.multiplier, Some(1.0));
    assert_eq!(nir_log.writes.lock().as_slice(), &[500_000]);

    // gray 128 is luminance 2048, so WL takes the full upward step
    let wl_update = report.get(ChannelKind::WhiteLight).unwrap();
    assert_eq!(wl_update.cutoff, Some(2048));
    assert_eq!(wl_log.writes.lock().as_slice(), &[66_000]);
}

#[test]
fn test_near_target_white_light_moves_within_rounding() {
    let (mut controller, _, _) = joint_controller();
    let wl = gray_wl(188);
    let nir = Frame::filled_mono16(WIDTH, HEIGHT, ChannelKind::NearInfrared, 3000).unwrap();

    controller
        .step(ChannelSet::Joint {
            white_light: &wl,
            near_infrared: &nir,
        })
        .unwrap();

    let exposure = controller.exposure(ChannelKind::WhiteLight).unwrap() as f64;
    assert!((exposure - 60_000.0).abs() / 60_000.0 < 0.003);
    assert_eq!(controller.exposure(ChannelKind::NearInfrared), Some(500_000));
}

#[test]
fn test_dim_infrared_steps_up_by_the_clamp() {
    // 95% of the field at 500, the rest dimmer but above the mask,
    // plus masked-out black corners
    let mut data = vec![500u16; WIDTH * HEIGHT];
    for (i, value) in data.iter_mut().enumerate() {
        if i % 20 == 0 {
            *value = 100;
        }
        if i % WIDTH < 8 {
            *value = 0;
        }
    }
    let nir = Frame::new(WIDTH, HEIGHT, ChannelKind::NearInfrared, 1, PixelData::Mono16(data)).unwrap();

    let analyzer = PercentileAnalyzer::default();
    let cutoffs = analyzer.cutoffs(ChannelSet::NearInfrared(&nir)).unwrap();
    assert_eq!(cutoffs.get(ChannelKind::NearInfrared), Some(&Some(500)));

    let log = WriteLog::new();
    let devices: ChannelSet<Arc<dyn CameraDevice>> = ChannelSet::NearInfrared(log.clone());
    let mut controller = ExposureController::new(&ExposureParams::default(), 32, devices);
    controller.set_manual(ChannelKind::NearInfrared, 300_000).unwrap();

    let report = controller.step(ChannelSet::NearInfrared(&nir)).unwrap();
    let update = report.get(ChannelKind::NearInfrared).unwrap();
    assert_eq!(update.multiplier, Some(1.1));
    assert_eq!(update.exposure, 330_000);
    assert_eq!(update.outcome, UpdateOutcome::Applied);

    // a second step hits the absolute ceiling
    controller.set_manual(ChannelKind::NearInfrared, 530_000).unwrap();
    controller.step(ChannelSet::NearInfrared(&nir)).unwrap();
    assert_eq!(controller.exposure(ChannelKind::NearInfrared), Some(550_000));
}

#[test]
fn test_median_matches_reference_on_full_frame() {
    let mut state: u32 = 0xdead_beef;
    let data: Vec<u16> = (0..WIDTH * HEIGHT)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % 4096) as u16
        })
        .collect();
    let mut frame = Frame::new(
        WIDTH,
        HEIGHT,
        ChannelKind::NearInfrared,
        1,
        PixelData::Mono16(data.clone()),
    )
    .unwrap();

    RollingMedianFilter::new(MedianFilterConfig {
        enabled: true,
        radius: 1,
        border: BorderPolicy::Preserve,
    })
    .apply(&mut frame)
    .unwrap();

    let filtered = frame.as_mono16().unwrap();
    for &(x, y) in &[(1, 1), (320, 240), (638, 1), (1, 478), (638, 478), (123, 457)] {
        assert_eq!(filtered[y * WIDTH + x], sorted_window_median(&data, WIDTH, x, y, 1));
    }
    assert_eq!(filtered[0], data[0]);
    assert_eq!(filtered[WIDTH * HEIGHT - 1], data[WIDTH * HEIGHT - 1]);
}

#[test]
fn test_display_path_produces_overlay() {
    let bayer = Frame::new(
        WIDTH,
        HEIGHT,
        ChannelKind::WhiteLight,
        4,
        PixelData::Bayer8(vec![128; WIDTH * HEIGHT]),
    )
    .unwrap();
    let wl = CpuDebayer::default().process(&bayer).unwrap();

    let mut nir_data = vec![0u16; WIDTH * HEIGHT];
    for value in nir_data.iter_mut().skip(WIDTH * HEIGHT / 2) {
        *value = 150;
    }
    let nir = Frame::new(WIDTH, HEIGHT, ChannelKind::NearInfrared, 5, PixelData::Mono16(nir_data))
        .unwrap();
    let (colored, _) = ColorMapper::new(ColorScheme::even_split(10, 200))
        .colorize(&nir)
        .unwrap();

    let composite = Compositor::new(1.0, false).compose(&wl, &colored).unwrap();
    let rgb = composite.as_rgb8().unwrap();
    assert_eq!(composite.sequence_id(), 5);
    // top half has no NIR signal and shows the WL frame
    assert_eq!(&rgb[..3], &[128, 128, 128]);
    // bottom half is fully covered by the pseudo-color
    let last = rgb.len() - 3;
    assert_eq!(&rgb[last..], &colored.as_rgb8().unwrap()[last..]);
    assert_ne!(&rgb[last..], &[128, 128, 128]);
}
