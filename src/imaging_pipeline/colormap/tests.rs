#[cfg(test)]
mod tests {
    use crate::imaging_pipeline::colormap::{
        calibrate_low_cutoff, enforce_strictly_increasing, ColorMapper, ColorScheme,
        ColorThresholds, DEFAULT_CALIBRATION_MARGIN,
    };
    use crate::imaging_pipeline::common::ChannelKind;
    use crate::imaging_pipeline::frame::{Frame, PixelData};
    use crate::imaging_pipeline::histogram::IntensityHistogram;

    fn nir_frame(width: usize, height: usize, data: Vec<u16>) -> Frame {
        Frame::new(width, height, ChannelKind::NearInfrared, 7, PixelData::Mono16(data)).unwrap()
    }

    /// 100 pixels at 11..=110 above a cutoff of 10, plus dark padding.
    fn ramp_frame() -> Frame {
        let mut data: Vec<u16> = (11..=110).collect();
        data.extend(std::iter::repeat_n(5, 20));
        nir_frame(12, 10, data)
    }

    #[test]
    fn test_even_split_edges() {
        let thresholds = ColorThresholds::even_split(10, 200);
        assert_eq!(thresholds.edges(), &[10, 42, 73, 105, 137, 168, 200]);
        assert!(thresholds.is_gradient());
    }

    #[test]
    fn test_narrow_window_is_widened() {
        assert_eq!(
            ColorScheme::even_split(500, 520),
            ColorScheme::EvenSplit {
                min_val: 500,
                max_val: 600
            }
        );
        let thresholds = ColorThresholds::even_split(4090, 4095);
        assert_eq!(thresholds.edges().first(), Some(&3995));
        assert_eq!(thresholds.edges().last(), Some(&4095));
        assert!(thresholds.is_strictly_increasing());
    }

    #[test]
    fn test_even_split_gradient_colors() {
        let thresholds = ColorThresholds::even_split(10, 200);
        assert_eq!(thresholds.color_of(0), [0, 0, 0]);
        assert_eq!(thresholds.color_of(10), [0, 0, 0]);
        // halfway between black and blue
        assert_eq!(thresholds.color_of(26), [0, 0, 128]);
        assert_eq!(thresholds.color_of(42), [0, 0, 255]);
        assert_eq!(thresholds.color_of(105), [0, 255, 0]);
        assert_eq!(thresholds.color_of(168), [255, 0, 0]);
        assert_eq!(thresholds.color_of(201), [255, 255, 255]);
        assert_eq!(thresholds.color_of(4095), [255, 255, 255]);
    }

    #[test]
    fn test_percentile_edges_from_ramp() {
        let mapper = ColorMapper::new(ColorScheme::percentile_split(10));
        let thresholds = mapper.thresholds_for(&ramp_frame()).unwrap();
        assert_eq!(thresholds.edges(), &[10, 28, 45, 62, 79, 96]);
        assert!(!thresholds.is_gradient());
    }

    #[test]
    fn test_percentile_flat_bands() {
        let thresholds = ColorThresholds::from_percentiles(10, [28, 45, 62, 79, 96]);
        assert_eq!(thresholds.color_of(10), [0, 0, 0]);
        assert_eq!(thresholds.color_of(11), [0, 0, 255]);
        assert_eq!(thresholds.color_of(28), [0, 0, 255]);
        assert_eq!(thresholds.color_of(29), [0, 255, 255]);
        assert_eq!(thresholds.color_of(50), [0, 255, 0]);
        assert_eq!(thresholds.color_of(70), [255, 255, 0]);
        assert_eq!(thresholds.color_of(96), [255, 0, 0]);
        assert_eq!(thresholds.color_of(97), [255, 255, 255]);
    }

    #[test]
    fn test_flat_histogram_is_tie_broken() {
        let mut counts = vec![0u32; 501];
        counts[500] = 1000;
        let histogram = IntensityHistogram::from_counts(&counts);
        let thresholds = ColorThresholds::percentile_split(10, &histogram);
        assert_eq!(thresholds.edges(), &[10, 500, 501, 502, 503, 504]);
    }

    #[test]
    fn test_no_pixel_above_cutoff_falls_back() {
        let frame = nir_frame(4, 4, vec![5; 16]);
        let mapper = ColorMapper::new(ColorScheme::percentile_split(10));
        let thresholds = mapper.thresholds_for(&frame).unwrap();
        assert_eq!(thresholds.edges(), &[10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_strict_order_for_non_decreasing_sequences() {
        let sequences: [&[u16]; 5] = [
            &[10, 10, 10, 10, 10, 10],
            &[0, 0, 1, 1, 2, 2],
            &[3, 40, 40, 41, 90, 90],
            &[100, 200, 300, 400, 500, 600],
            &[4095, 4095, 4095],
        ];
        for sequence in sequences {
            let mut values = sequence.to_vec();
            enforce_strictly_increasing(&mut values);
            assert!(values.windows(2).all(|w| w[0] < w[1]), "{:?}", values);
            assert_eq!(values[0], sequence[0]);
        }
    }

    #[test]
    fn test_colorize_keeps_frame_identity() {
        let mapper = ColorMapper::new(ColorScheme::even_split(10, 200));
        let frame = nir_frame(3, 2, vec![0, 42, 105, 168, 200, 3000]);
        let (colored, thresholds) = mapper.colorize(&frame).unwrap();
        assert_eq!(thresholds.edges().len(), 7);
        assert_eq!(colored.sequence_id(), 7);
        assert_eq!(colored.channel(), ChannelKind::NearInfrared);
        assert_eq!(
            colored.as_rgb8().unwrap(),
            &[0, 0, 0, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn test_colorize_rejects_white_light() {
        let mapper = ColorMapper::default();
        let wl = Frame::filled_mono16(4, 4, ChannelKind::WhiteLight, 100).unwrap();
        assert!(mapper.colorize(&wl).is_err());
    }

    #[test]
    fn test_calibration_skips_first_row_and_column() {
        let mut data = vec![100u16; 16];
        for i in 0..4 {
            data[i] = 4000;
            data[i * 4] = 4000;
        }
        let frame = nir_frame(4, 4, data);
        assert_eq!(calibrate_low_cutoff(&frame, DEFAULT_CALIBRATION_MARGIN).unwrap(), 102);
    }

    #[test]
    fn test_calibration_of_single_row() {
        let frame = nir_frame(4, 1, vec![10, 20, 30, 40]);
        assert_eq!(calibrate_low_cutoff(&frame, 0).unwrap(), 25);
    }

    #[test]
    fn test_calibrated_cutoff_drives_mapper() {
        let mut mapper = ColorMapper::new(ColorScheme::even_split(10, 200));
        let background = nir_frame(4, 4, vec![8; 16]);
        let cutoff = calibrate_low_cutoff(&background, DEFAULT_CALIBRATION_MARGIN).unwrap();
        mapper.set_low_cutoff(cutoff);
        assert_eq!(mapper.scheme(), ColorScheme::PercentileSplit { low_cutoff: 10 });

        let (colored, _) = mapper.colorize(&ramp_frame()).unwrap();
        let rgb = colored.as_rgb8().unwrap();
        // first pixel (11) sits in the first band, the padding is black
        assert_eq!(&rgb[..3], &[0, 0, 255]);
        assert_eq!(&rgb[rgb.len() - 3..], &[0, 0, 0]);
    }
}
