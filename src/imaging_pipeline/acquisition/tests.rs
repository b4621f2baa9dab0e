#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::imaging_pipeline::acquisition::{
        event_mailbox, AcquisitionChannel, CameraDevice, CaptureWorker, ChannelEvent,
        ChannelState, SyntheticCamera, SyntheticScene, MAILBOX_CAPACITY,
    };
    use crate::imaging_pipeline::common::{CaptureError, ChannelKind};
    use crate::imaging_pipeline::denoise::MedianFilterConfig;
    use crate::imaging_pipeline::frame::{Frame, PixelFormat};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn nir(value: u16) -> Frame {
        Frame::filled_mono16(4, 4, ChannelKind::NearInfrared, value).unwrap()
    }

    #[test]
    fn test_submit_then_latest() {
        let (tx, rx) = event_mailbox();
        let channel = AcquisitionChannel::new(ChannelKind::NearInfrared, tx);
        assert!(channel.latest().is_none());

        assert!(channel.submit(nir(10)));
        assert!(channel.submit(nir(20)));

        let latest = channel.latest().unwrap();
        assert_eq!(latest.as_mono16().unwrap()[0], 20);
        assert_eq!(latest.sequence_id(), 2);
        assert_eq!(
            rx.try_recv().unwrap(),
            ChannelEvent::FrameReady {
                channel: ChannelKind::NearInfrared,
                sequence_id: 1
            }
        );
    }

    #[test]
    fn test_snapshot_survives_next_submit() {
        let (tx, _rx) = event_mailbox();
        let channel = AcquisitionChannel::new(ChannelKind::NearInfrared, tx);
        channel.submit(nir(10));
        let held = channel.latest().unwrap();
        channel.submit(nir(99));
        assert!(held.as_mono16().unwrap().iter().all(|&v| v == 10));
        assert!(channel.latest().unwrap().as_mono16().unwrap().iter().all(|&v| v == 99));
    }

    #[test]
    fn test_submit_never_blocks_on_full_mailbox() {
        let (tx, rx) = event_mailbox();
        let channel = AcquisitionChannel::new(ChannelKind::NearInfrared, tx);
        for value in 0..(MAILBOX_CAPACITY as u16 * 3) {
            assert!(channel.submit(nir(value)));
        }
        assert_eq!(rx.len(), MAILBOX_CAPACITY);
        assert_eq!(
            channel.latest().unwrap().as_mono16().unwrap()[0],
            MAILBOX_CAPACITY as u16 * 3 - 1
        );
    }

    #[test]
    fn test_terminal_states_drop_submissions() {
        let (tx, rx) = event_mailbox();
        let channel = AcquisitionChannel::new(ChannelKind::WhiteLight, tx);
        channel.mark_disconnected();
        assert_eq!(channel.state(), ChannelState::Disconnected);
        assert_eq!(rx.try_recv().unwrap(), ChannelEvent::Disconnected(ChannelKind::WhiteLight));

        let frame = Frame::filled_rgb8(2, 2, ChannelKind::WhiteLight, [1, 1, 1]).unwrap();
        assert!(!channel.submit(frame));
        assert!(channel.latest().is_none());

        // close does not resurrect or overwrite a disconnected channel
        channel.close();
        assert_eq!(channel.state(), ChannelState::Disconnected);

        let (tx, _rx) = event_mailbox();
        let closed = AcquisitionChannel::new(ChannelKind::NearInfrared, tx);
        closed.close();
        assert_eq!(closed.state(), ChannelState::Closed);
        assert!(!closed.submit(nir(1)));
    }

    #[test]
    fn test_concurrent_reader_never_sees_torn_frame() {
        let (tx, _rx) = event_mailbox();
        let channel = Arc::new(AcquisitionChannel::new(ChannelKind::NearInfrared, tx));

        let writer_channel = Arc::clone(&channel);
        let writer = std::thread::spawn(move || {
            for value in 0..2000u16 {
                let frame = Frame::filled_mono16(64, 64, ChannelKind::NearInfrared, value).unwrap();
                writer_channel.submit(frame);
            }
        });

        for _ in 0..2000 {
            if let Some(frame) = channel.latest() {
                let data = frame.as_mono16().unwrap();
                let first = data[0];
                assert!(data.iter().all(|&v| v == first));
            }
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_worker_publishes_filtered_frames() {
        let camera = Arc::new(
            SyntheticCamera::new(ChannelKind::NearInfrared, 32, 24, 250_000)
                .with_scene(SyntheticScene {
                    counts_per_us: 0.004,
                    circular_field: false,
                    noise: 0,
                })
                .with_frame_interval(Duration::from_millis(1)),
        );
        let (tx, rx) = event_mailbox();
        let channel = Arc::new(AcquisitionChannel::new(ChannelKind::NearInfrared, tx));

        let mut worker = CaptureWorker::spawn(
            camera.clone(),
            Arc::clone(&channel),
            Some(MedianFilterConfig::default()),
        )
        .unwrap();

        let event = rx.recv_timeout(RECV_TIMEOUT).unwrap();
        assert!(matches!(event, ChannelEvent::FrameReady { channel: ChannelKind::NearInfrared, .. }));
        let frame = channel.latest().unwrap();
        assert_eq!(frame.format(), PixelFormat::Mono16);
        assert!(frame.as_mono16().unwrap().iter().all(|&v| v == 1000));

        worker.stop();
        assert!(worker.is_finished());
    }

    #[test]
    fn test_worker_marks_channel_disconnected() {
        let camera = Arc::new(
            SyntheticCamera::new(ChannelKind::WhiteLight, 8, 8, 60_000)
                .with_frame_interval(Duration::from_millis(1))
                .disconnect_after(2),
        );
        let (tx, rx) = event_mailbox();
        let channel = Arc::new(AcquisitionChannel::new(ChannelKind::WhiteLight, tx));
        let _worker = CaptureWorker::spawn(camera.clone(), Arc::clone(&channel), None).unwrap();

        let mut frames = 0;
        loop {
            match rx.recv_timeout(RECV_TIMEOUT).unwrap() {
                ChannelEvent::FrameReady { .. } => frames += 1,
                ChannelEvent::Disconnected(kind) => {
                    assert_eq!(kind, ChannelKind::WhiteLight);
                    break;
                }
            }
        }
        assert_eq!(frames, 2);
        assert_eq!(channel.state(), ChannelState::Disconnected);
    }

    #[test]
    fn test_stop_unblocks_slow_capture() {
        let camera = Arc::new(
            SyntheticCamera::new(ChannelKind::NearInfrared, 4, 4, 1000)
                .with_frame_interval(Duration::from_secs(60)),
        );
        let (tx, _rx) = event_mailbox();
        let channel = Arc::new(AcquisitionChannel::new(ChannelKind::NearInfrared, tx));
        let mut worker = CaptureWorker::spawn(camera.clone(), Arc::clone(&channel), None).unwrap();

        worker.stop();
        assert!(worker.is_finished());
        assert!(channel.latest().is_none());
        assert_eq!(
            camera.capture_next_frame().unwrap_err(),
            CaptureError::Transient("capture interrupted".to_string())
        );
    }
}
