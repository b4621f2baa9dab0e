use tracing::warn;

use crate::imaging_pipeline::common::{ChannelKind, ChannelSet, Result};
use crate::imaging_pipeline::frame::{Frame, INTENSITY_BINS, MAX_INTENSITY};
use crate::imaging_pipeline::histogram::luminance::intensity_plane;

/// Fraction of valid pixel mass below the reported cutoff.
pub const DEFAULT_PERCENTILE: f64 = 0.95;

/// Pixel counts per 12-bit intensity, built fresh for every analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityHistogram {
    bins: Vec<u32>,
    total: u64,
}

impl Default for IntensityHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl IntensityHistogram {
    pub fn new() -> Self {
        Self {
            bins: vec![0; INTENSITY_BINS],
            total: 0,
        }
    }

    /// Histogram with the given per-bin counts; counts past the last bin
    /// are folded into it.
    pub fn from_counts(counts: &[u32]) -> Self {
        let mut histogram = Self::new();
        for (bin, &count) in counts.iter().enumerate() {
            let bin = bin.min(INTENSITY_BINS - 1);
            histogram.bins[bin] += count;
            histogram.total += count as u64;
        }
        histogram
    }

    /// Counts every sample of `plane` that the mask marks valid.
    pub fn from_masked(plane: &[u16], mask: &ValidMask) -> Self {
        let mut histogram = Self::new();
        for (&value, &valid) in plane.iter().zip(mask.bits.iter()) {
            if valid {
                histogram.add(value);
            }
        }
        histogram
    }

    pub fn add(&mut self, value: u16) {
        self.bins[value.min(MAX_INTENSITY) as usize] += 1;
        self.total += 1;
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    /// Number of valid pixels counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Smallest bin `i` whose cumulative count over `[0..=i]` exceeds
    /// `fraction` of the total. `None` when nothing was counted.
    pub fn percentile_cutoff(&self, fraction: f64) -> Option<u16> {
        if self.total == 0 {
            return None;
        }
        let limit = normalize_fraction(fraction) * self.total as f64;
        let mut cumulative = 0u64;
        for (bin, &count) in self.bins.iter().enumerate() {
            cumulative += count as u64;
            if cumulative as f64 > limit {
                return Some(bin as u16);
            }
        }
        Some(MAX_INTENSITY)
    }
}

/// Clamps a percentile into `0..=1`; a non-finite one falls back to
/// `DEFAULT_PERCENTILE`.
pub fn normalize_fraction(fraction: f64) -> f64 {
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        DEFAULT_PERCENTILE
    }
}

/// Which pixels take part in histogram analysis.
///
/// Pixels at or below the cutoff are treated as the dark corners left by
/// the endoscope's circular field of view. A cutoff of zero disables
/// masking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMask {
    bits: Vec<bool>,
    valid: usize,
}

impl ValidMask {
    pub fn from_plane(plane: &[u16], cutoff: u16) -> Self {
        if cutoff == 0 {
            return Self::all(plane.len());
        }
        let bits: Vec<bool> = plane.iter().map(|&v| v > cutoff).collect();
        let valid = bits.iter().filter(|&&b| b).count();
        Self { bits, valid }
    }

    pub fn all(len: usize) -> Self {
        Self {
            bits: vec![true; len],
            valid: len,
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.valid
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }
}

/// Percentile cutoffs for one or two co-registered channels.
#[derive(Debug, Clone, Copy)]
pub struct PercentileAnalyzer {
    pub mask_cutoff: u16,
    pub fraction: f64,
}

impl Default for PercentileAnalyzer {
    fn default() -> Self {
        Self {
            mask_cutoff: 32,
            fraction: DEFAULT_PERCENTILE,
        }
    }
}

impl PercentileAnalyzer {
    pub fn new(mask_cutoff: u16, fraction: f64) -> Self {
        Self {
            mask_cutoff,
            fraction: normalize_fraction(fraction),
        }
    }

    /// Histogram of one frame masked by its own intensities.
    pub fn histogram(&self, frame: &Frame) -> Result<IntensityHistogram> {
        let plane = intensity_plane(frame)?;
        let mask = ValidMask::from_plane(&plane, self.mask_cutoff);
        Ok(IntensityHistogram::from_masked(&plane, &mask))
    }

    /// Histograms for every frame in the set.
    ///
    /// When a white-light frame is present its luminance mask is computed
    /// once and applied to both channels, so both histograms cover the same
    /// valid pixels. The infrared channel falls back to its own mask when the
    /// two frames are not the same shape.
    pub fn histograms(&self, frames: ChannelSet<&Frame>) -> Result<ChannelSet<IntensityHistogram>> {
        let shared = match frames.get(ChannelKind::WhiteLight) {
            Some(wl) => {
                let plane = intensity_plane(wl)?;
                let mask = ValidMask::from_plane(&plane, self.mask_cutoff);
                Some((wl.width(), wl.height(), plane, mask))
            }
            None => None,
        };

        let mut failure = None;
        let histograms = frames.map(|kind, frame| {
            let computed = match (&shared, kind) {
                (Some((_, _, plane, mask)), ChannelKind::WhiteLight) => {
                    Ok(IntensityHistogram::from_masked(plane, mask))
                }
                (Some((w, h, _, mask)), ChannelKind::NearInfrared)
                    if frame.width() == *w && frame.height() == *h =>
                {
                    intensity_plane(frame).map(|plane| IntensityHistogram::from_masked(&plane, mask))
                }
                (Some((w, h, _, _)), ChannelKind::NearInfrared) => {
                    warn!(
                        wl_width = *w,
                        wl_height = *h,
                        nir_width = frame.width(),
                        nir_height = frame.height(),
                        "Channel shapes differ, NIR histogram uses its own mask"
                    );
                    self.histogram(frame)
                }
                (None, _) => self.histogram(frame),
            };
            computed.unwrap_or_else(|e| {
                failure.get_or_insert(e);
                IntensityHistogram::new()
            })
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(histograms),
        }
    }

    /// Percentile cutoff per channel; `None` where no pixel was valid.
    pub fn cutoffs(&self, frames: ChannelSet<&Frame>) -> Result<ChannelSet<Option<u16>>> {
        let fraction = self.fraction;
        Ok(self
            .histograms(frames)?
            .map(|_, histogram| histogram.percentile_cutoff(fraction)))
    }
}
