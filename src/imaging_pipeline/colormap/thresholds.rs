use crate::imaging_pipeline::frame::MAX_INTENSITY;
use crate::imaging_pipeline::histogram::IntensityHistogram;

/// Narrowest allowed even-split window, in intensity units.
pub const MIN_WINDOW_SPAN: u16 = 100;

/// Fractions of above-cutoff pixels at which the percentile scheme places
/// its band edges.
pub const PERCENTILE_STOPS: [f64; 5] = [0.17, 0.34, 0.51, 0.68, 0.85];

const BLACK: [u8; 3] = [0, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const CYAN: [u8; 3] = [0, 255, 255];
const GREEN: [u8; 3] = [0, 255, 0];
const YELLOW: [u8; 3] = [255, 255, 0];
const RED: [u8; 3] = [255, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// Color at each even-split threshold; values in between are interpolated.
const GRADIENT_STOPS: [[u8; 3]; 7] = [BLACK, BLUE, CYAN, GREEN, YELLOW, RED, WHITE];

/// Flat color of each percentile band above the low cutoff.
const FLAT_BANDS: [[u8; 3]; 5] = [BLUE, CYAN, GREEN, YELLOW, RED];

/// How band edges are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// Seven evenly spaced edges over a user window, smooth gradients
    EvenSplit { min_val: u16, max_val: u16 },
    /// Calibrated low cutoff plus five histogram percentiles, flat bands
    PercentileSplit { low_cutoff: u16 },
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::PercentileSplit { low_cutoff: 2 }
    }
}

impl ColorScheme {
    /// Even-split window widened to at least `MIN_WINDOW_SPAN`.
    pub fn even_split(min_val: u16, max_val: u16) -> Self {
        let (min_val, max_val) = widen_window(min_val, max_val);
        ColorScheme::EvenSplit { min_val, max_val }
    }

    pub fn percentile_split(low_cutoff: u16) -> Self {
        ColorScheme::PercentileSplit {
            low_cutoff: low_cutoff.min(MAX_INTENSITY),
        }
    }
}

fn widen_window(min_val: u16, max_val: u16) -> (u16, u16) {
    let min_val = min_val.min(MAX_INTENSITY - MIN_WINDOW_SPAN);
    let max_val = max_val.clamp(min_val + MIN_WINDOW_SPAN, MAX_INTENSITY);
    (min_val, max_val)
}

/// Forces every element to exceed its predecessor, bumping ties (and any
/// value that falls behind) to `previous + 1`.
pub fn enforce_strictly_increasing(values: &mut [u16]) {
    for i in 1..values.len() {
        if values[i] <= values[i - 1] {
            values[i] = values[i - 1].saturating_add(1);
        }
    }
}

/// Ordered band edges: values at or below the first map to black, values
/// above the last map to white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorThresholds {
    edges: Vec<u16>,
    gradient: bool,
}

impl ColorThresholds {
    /// Seven edges from `min_val` to `max_val` at even spacing.
    pub fn even_split(min_val: u16, max_val: u16) -> Self {
        let (min_val, max_val) = widen_window(min_val, max_val);
        let span = (max_val - min_val) as f64;
        let mut edges: Vec<u16> = (0..GRADIENT_STOPS.len())
            .map(|k| min_val + (span * k as f64 / 6.0).round() as u16)
            .collect();
        enforce_strictly_increasing(&mut edges);
        Self {
            edges,
            gradient: true,
        }
    }

    /// Low cutoff followed by the raw percentile edges, tie-broken into a
    /// strictly increasing sequence.
    pub fn from_percentiles(low_cutoff: u16, raw: [u16; 5]) -> Self {
        let mut edges = Vec::with_capacity(6);
        edges.push(low_cutoff);
        edges.extend_from_slice(&raw);
        enforce_strictly_increasing(&mut edges);
        Self {
            edges,
            gradient: false,
        }
    }

    /// Percentile edges from a histogram of the pixels above `low_cutoff`.
    ///
    /// With no pixel above the cutoff every pixel maps to black anyway; the
    /// edges then sit directly above the cutoff.
    pub fn percentile_split(low_cutoff: u16, histogram: &IntensityHistogram) -> Self {
        let total = histogram.total();
        let mut raw = [0u16; 5];
        if total == 0 {
            return Self::from_percentiles(low_cutoff, raw);
        }

        let mut stop = 0;
        let mut sum = 0u64;
        let bins = histogram.bins();
        for k in (low_cutoff as usize + 1)..bins.len() {
            sum += bins[k] as u64;
            let fraction = sum as f64 / total as f64;
            while stop < PERCENTILE_STOPS.len() && fraction > PERCENTILE_STOPS[stop] {
                raw[stop] = k as u16;
                stop += 1;
            }
            if stop == PERCENTILE_STOPS.len() {
                break;
            }
        }
        // only reachable if the histogram holds mass at or below the cutoff
        for edge in raw.iter_mut().skip(stop) {
            *edge = MAX_INTENSITY;
        }
        Self::from_percentiles(low_cutoff, raw)
    }

    pub fn edges(&self) -> &[u16] {
        &self.edges
    }

    pub fn low_cutoff(&self) -> u16 {
        self.edges[0]
    }

    pub fn is_gradient(&self) -> bool {
        self.gradient
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.edges.windows(2).all(|w| w[0] < w[1])
    }

    /// Display color of one intensity.
    pub fn color_of(&self, value: u16) -> [u8; 3] {
        let edges = &self.edges;
        if value <= edges[0] {
            return BLACK;
        }
        let Some(band) = edges.iter().position(|&edge| value <= edge) else {
            return WHITE;
        };

        if self.gradient {
            let lower = edges[band - 1];
            let upper = edges[band];
            let t = (value - lower) as f64 / (upper - lower) as f64;
            lerp(GRADIENT_STOPS[band - 1], GRADIENT_STOPS[band], t)
        } else {
            FLAT_BANDS.get(band - 1).copied().unwrap_or(WHITE)
        }
    }
}

fn lerp(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = from[c] as f64;
        let b = to[c] as f64;
        out[c] = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
    }
    out
}
