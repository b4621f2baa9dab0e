use tracing::trace;

use crate::imaging_pipeline::common::{PipelineError, Result};
use crate::imaging_pipeline::denoise::types::{BorderPolicy, MedianFilterConfig};
use crate::imaging_pipeline::frame::{Frame, INTENSITY_BINS, MAX_INTENSITY};

/// Square-window median filter with a sliding histogram.
///
/// The window walks the image in a snake: right along one row, down one
/// row, left along the next. Each step only touches the column (or row)
/// entering and the one leaving the window, so the per-pixel bookkeeping
/// cost does not grow with the window area. The median is then read back by
/// accumulating histogram bins from zero until the running count passes the
/// middle element.
pub struct RollingMedianFilter {
    config: MedianFilterConfig,
    histogram: Vec<u32>,
}

impl RollingMedianFilter {
    pub fn new(config: MedianFilterConfig) -> Self {
        Self {
            config,
            histogram: vec![0; INTENSITY_BINS],
        }
    }

    pub fn config(&self) -> &MedianFilterConfig {
        &self.config
    }

    /// Filters a Mono16 frame in place.
    pub fn apply(&mut self, frame: &mut Frame) -> Result<()> {
        let width = frame.width();
        let height = frame.height();
        let data = frame.as_mono16_mut()?;
        self.filter_plane(data, width, height)
    }

    /// Filters a row-major plane of `width * height` samples in place.
    pub fn filter_plane(&mut self, data: &mut [u16], width: usize, height: usize) -> Result<()> {
        if data.len() != width * height {
            return Err(PipelineError::BufferLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        let r = self.config.radius;
        if r == 0 || data.is_empty() {
            return Ok(());
        }

        match self.config.border {
            BorderPolicy::Preserve | BorderPolicy::Zero => {
                let source = data.to_vec();
                if width > 2 * r && height > 2 * r {
                    self.snake(&source, width, height, |x, y, median| {
                        data[y * width + x] = median;
                    });
                }
                if self.config.border == BorderPolicy::Zero {
                    zero_border(data, width, height, r);
                }
            }
            BorderPolicy::Replicate => {
                let padded_width = width + 2 * r;
                let padded_height = height + 2 * r;
                let padded = pad_replicate(data, width, height, r);
                self.snake(&padded, padded_width, padded_height, |x, y, median| {
                    data[(y - r) * width + (x - r)] = median;
                });
            }
        }
        trace!(width, height, radius = r, "Median filter pass complete");
        Ok(())
    }

    /// Visits every window center of `source` in snake order, reporting
    /// `(x, y, median)` in source coordinates.
    fn snake(
        &mut self,
        source: &[u16],
        width: usize,
        height: usize,
        mut emit: impl FnMut(usize, usize, u16),
    ) {
        let r = self.config.radius;
        let middle = self.config.middle_element();
        let sample = |x: usize, y: usize| source[y * width + x].min(MAX_INTENSITY) as usize;

        self.histogram.iter_mut().for_each(|bin| *bin = 0);
        for y in 0..=2 * r {
            for x in 0..=2 * r {
                self.histogram[sample(x, y)] += 1;
            }
        }

        let mut x = r;
        let mut y = r;
        let mut rightward = true;
        emit(x, y, self.median(middle));

        loop {
            if rightward {
                while x + r + 1 < width {
                    for dy in 0..=2 * r {
                        self.histogram[sample(x - r, y - r + dy)] -= 1;
                        self.histogram[sample(x + r + 1, y - r + dy)] += 1;
                    }
                    x += 1;
                    emit(x, y, self.median(middle));
                }
            } else {
                while x > r {
                    for dy in 0..=2 * r {
                        self.histogram[sample(x + r, y - r + dy)] -= 1;
                        self.histogram[sample(x - r - 1, y - r + dy)] += 1;
                    }
                    x -= 1;
                    emit(x, y, self.median(middle));
                }
            }

            if y + r + 1 >= height {
                break;
            }
            for dx in 0..=2 * r {
                self.histogram[sample(x - r + dx, y - r)] -= 1;
                self.histogram[sample(x - r + dx, y + r + 1)] += 1;
            }
            y += 1;
            emit(x, y, self.median(middle));
            rightward = !rightward;
        }
    }

    fn median(&self, middle: usize) -> u16 {
        let mut sum = 0usize;
        for (bin, &count) in self.histogram.iter().enumerate() {
            sum += count as usize;
            if sum > middle {
                return bin as u16;
            }
        }
        MAX_INTENSITY
    }
}

fn zero_border(data: &mut [u16], width: usize, height: usize, r: usize) {
    for y in 0..height {
        for x in 0..width {
            if x < r || y < r || x + r >= width || y + r >= height {
                data[y * width + x] = 0;
            }
        }
    }
}

fn pad_replicate(data: &[u16], width: usize, height: usize, r: usize) -> Vec<u16> {
    let padded_width = width + 2 * r;
    let padded_height = height + 2 * r;
    let mut padded = Vec::with_capacity(padded_width * padded_height);
    for py in 0..padded_height {
        let y = py.saturating_sub(r).min(height - 1);
        for px in 0..padded_width {
            let x = px.saturating_sub(r).min(width - 1);
            padded.push(data[y * width + x]);
        }
    }
    padded
}

/// Median of the `(2r+1)^2` window centered at `(x, y)`, by sorting.
///
/// Reference implementation for verification and benchmarking; the window
/// must fit inside the plane.
pub fn sorted_window_median(data: &[u16], width: usize, x: usize, y: usize, radius: usize) -> u16 {
    let mut window = Vec::with_capacity((2 * radius + 1) * (2 * radius + 1));
    for wy in y - radius..=y + radius {
        for wx in x - radius..=x + radius {
            window.push(data[wy * width + wx].min(MAX_INTENSITY));
        }
    }
    window.sort_unstable();
    window[window.len() / 2]
}
