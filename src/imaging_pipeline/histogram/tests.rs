#[cfg(test)]
mod tests {
    use crate::imaging_pipeline::common::{ChannelKind, ChannelSet};
    use crate::imaging_pipeline::frame::{Frame, PixelData, INTENSITY_BINS, MAX_INTENSITY};
    use crate::imaging_pipeline::histogram::{
        luminance_12bit, luminance_plane, normalize_fraction, IntensityHistogram,
        PercentileAnalyzer, ValidMask, DEFAULT_PERCENTILE,
    };

    fn nir_frame(width: usize, height: usize, data: Vec<u16>) -> Frame {
        Frame::new(width, height, ChannelKind::NearInfrared, 0, PixelData::Mono16(data)).unwrap()
    }

    #[test]
    fn test_all_mass_in_bin_zero() {
        let histogram = IntensityHistogram::from_counts(&[1000]);
        assert_eq!(histogram.percentile_cutoff(0.95), Some(0));
    }

    #[test]
    fn test_uniform_mass_unmasked() {
        let data: Vec<u16> = (0..INTENSITY_BINS as u16).collect();
        let frame = nir_frame(64, 64, data);
        let analyzer = PercentileAnalyzer::new(0, 0.95);

        let histogram = analyzer.histogram(&frame).unwrap();
        assert_eq!(histogram.total(), 4096);

        let cutoff = histogram.percentile_cutoff(0.95).unwrap() as i32;
        let expected = (0.95f64 * 4095.0).round() as i32;
        assert!((cutoff - expected).abs() <= 1, "cutoff {cutoff} vs {expected}");
    }

    #[test]
    fn test_non_finite_percentile_uses_default() {
        let data: Vec<u16> = (0..INTENSITY_BINS as u16).collect();
        let histogram = IntensityHistogram::from_counts(&vec![1; INTENSITY_BINS]);
        let expected = histogram.percentile_cutoff(DEFAULT_PERCENTILE);
        assert_eq!(histogram.percentile_cutoff(f64::NAN), expected);
        assert_ne!(expected, Some(MAX_INTENSITY));

        let analyzer = PercentileAnalyzer::new(0, f64::NAN);
        assert_eq!(analyzer.fraction, DEFAULT_PERCENTILE);
        let cutoffs = analyzer
            .cutoffs(ChannelSet::NearInfrared(&nir_frame(64, 64, data)))
            .unwrap();
        assert_eq!(cutoffs.get(ChannelKind::NearInfrared), Some(&expected));
        assert_eq!(normalize_fraction(1.5), 1.0);
    }

    #[test]
    fn test_empty_histogram_has_no_cutoff() {
        let histogram = IntensityHistogram::new();
        assert_eq!(histogram.percentile_cutoff(0.95), None);

        // every pixel at or below the mask cutoff
        let frame = nir_frame(8, 8, vec![32; 64]);
        let analyzer = PercentileAnalyzer::new(32, 0.95);
        let cutoffs = analyzer.cutoffs(ChannelSet::NearInfrared(&frame)).unwrap();
        assert_eq!(cutoffs.get(ChannelKind::NearInfrared), Some(&None));
    }

    #[test]
    fn test_mask_is_strictly_greater() {
        let mask = ValidMask::from_plane(&[0, 32, 33, 4000], 32);
        assert_eq!(mask.valid_count(), 2);
        assert!(!mask.is_valid(1));
        assert!(mask.is_valid(2));
        assert!(!mask.is_valid(99));
    }

    #[test]
    fn test_samples_above_domain_saturate() {
        let frame = nir_frame(2, 2, vec![60000; 4]);
        let histogram = PercentileAnalyzer::new(0, 0.95).histogram(&frame).unwrap();
        assert_eq!(histogram.bins()[INTENSITY_BINS - 1], 4);
        assert_eq!(histogram.percentile_cutoff(0.5), Some(4095));
    }

    #[test]
    fn test_luminance_formula() {
        assert_eq!(luminance_12bit(0, 0, 0), 0);
        assert_eq!(luminance_12bit(128, 128, 128), 2048);
        assert_eq!(luminance_12bit(255, 255, 255), 4080);
        // green dominates: 0.72 * 100 * 16
        assert_eq!(luminance_12bit(0, 100, 0), 1152);

        let wl = Frame::filled_rgb8(2, 1, ChannelKind::WhiteLight, [188, 188, 188]).unwrap();
        assert_eq!(luminance_plane(&wl).unwrap(), vec![3008, 3008]);
    }

    #[test]
    fn test_joint_analysis_shares_the_white_light_mask() {
        // left half dark on WL (masked out), right half lit
        let width = 10;
        let height = 10;
        let mut rgb = Vec::with_capacity(width * height * 3);
        let mut nir = Vec::with_capacity(width * height);
        for _y in 0..height {
            for x in 0..width {
                let v = if x < 5 { 0u8 } else { 200 };
                rgb.extend_from_slice(&[v, v, v]);
                // NIR is bright under the WL-dark region so a self-mask would count it
                nir.push(if x < 5 { 4000 } else { 700 });
            }
        }
        let wl = Frame::new(width, height, ChannelKind::WhiteLight, 0, PixelData::Rgb8(rgb)).unwrap();
        let nir = nir_frame(width, height, nir);

        let analyzer = PercentileAnalyzer::new(32, 0.95);
        let histograms = analyzer
            .histograms(ChannelSet::Joint {
                white_light: &wl,
                near_infrared: &nir,
            })
            .unwrap();

        let wl_hist = histograms.get(ChannelKind::WhiteLight).unwrap();
        let nir_hist = histograms.get(ChannelKind::NearInfrared).unwrap();
        assert_eq!(wl_hist.total(), 50);
        assert_eq!(nir_hist.total(), wl_hist.total());
        assert_eq!(nir_hist.percentile_cutoff(0.95), Some(700));
    }

    #[test]
    fn test_mismatched_shapes_fall_back_to_self_mask() {
        let wl = Frame::filled_rgb8(4, 4, ChannelKind::WhiteLight, [200, 200, 200]).unwrap();
        let nir = nir_frame(2, 2, vec![10, 10, 500, 500]);

        let histograms = PercentileAnalyzer::new(32, 0.95)
            .histograms(ChannelSet::Joint {
                white_light: &wl,
                near_infrared: &nir,
            })
            .unwrap();
        assert_eq!(histograms.get(ChannelKind::NearInfrared).unwrap().total(), 2);
    }

    #[test]
    fn test_bayer_frames_are_rejected() {
        let raw = Frame::new(2, 2, ChannelKind::WhiteLight, 0, PixelData::Bayer8(vec![0; 4])).unwrap();
        assert!(PercentileAnalyzer::default().histogram(&raw).is_err());
    }
}
