use std::sync::Arc;

use anyhow::Context;
use multichannel_imaging::imaging_pipeline::{
    CameraDevice, ChannelKind, ChannelSet, DisplayView, ImagingSession, NullDisplay,
    PipelineConfig, SyntheticCamera, SyntheticScene, TiffCompression, TiffStackEncoder,
};
use multichannel_imaging::logger::{self, info};

const DEFAULT_CYCLES: u64 = 48;

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting multichannel imaging demo...");

    let mut args = std::env::args().skip(1);
    let cycles = match args.next() {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("invalid cycle count: {value}"))?,
        None => DEFAULT_CYCLES,
    };
    let recording_path = args.next();

    let wl = Arc::new(
        SyntheticCamera::new(ChannelKind::WhiteLight, 640, 480, 60_000).with_scene(SyntheticScene {
            noise: 6,
            ..SyntheticScene::default()
        }),
    );
    let nir = Arc::new(
        SyntheticCamera::new(ChannelKind::NearInfrared, 640, 480, 500_000).with_scene(
            SyntheticScene {
                counts_per_us: 0.003,
                noise: 300,
                ..SyntheticScene::default()
            },
        ),
    );
    let devices: ChannelSet<Arc<dyn CameraDevice>> = ChannelSet::Joint {
        white_light: wl.clone(),
        near_infrared: nir.clone(),
    };

    let config = PipelineConfig::builder().opacity(0.3).build();
    info!("Auto exposure: {}", if config.auto_expose { "enabled" } else { "disabled" });
    info!("Color scheme: {:?}", config.color_scheme);

    let mut session = ImagingSession::start(config, devices, NullDisplay)?;

    if let Some(path) = recording_path {
        let encoder = TiffStackEncoder::create(&path, TiffCompression::DeflateFast)
            .with_context(|| format!("cannot record to {path}"))?;
        session.start_recording(DisplayView::Overlay, Box::new(encoder))?;
    }

    let summary = session.run(cycles)?;
    for (channel, exposure) in &summary.exposures {
        info!("{} exposure settled at {} us", channel, exposure);
    }
    info!(
        "Completed {} cycles ({} WL / {} NIR frames captured)",
        summary.cycles,
        wl.frames_captured(),
        nir.frames_captured()
    );

    session.shutdown()?;
    Ok(())
}
