//! Exposure state and parameters

use crate::imaging_pipeline::histogram::DEFAULT_PERCENTILE;

/// Percentile cutoff the loop steers toward, on the 0..4095 scale.
pub const DEFAULT_TARGET_CUTOFF: f64 = 3000.0;

/// Largest relative exposure change per control step (±10%).
pub const DEFAULT_MAX_STEP_RATIO: f64 = 0.10;

/// Clamps a step ratio into `0..=1`; a non-finite one falls back to
/// `DEFAULT_MAX_STEP_RATIO`.
pub fn normalize_step_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        DEFAULT_MAX_STEP_RATIO
    }
}

/// Absolute exposure limits of one camera, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureBounds {
    pub min: u32,
    pub max: u32,
}

impl ExposureBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Exposure of one camera. `bounds.min <= current <= bounds.max` holds
/// after every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureState {
    current: u32,
    bounds: ExposureBounds,
    max_step_ratio: f64,
}

impl ExposureState {
    pub fn new(current: u32, bounds: ExposureBounds, max_step_ratio: f64) -> Self {
        Self {
            current: bounds.clamp(current),
            bounds,
            max_step_ratio: normalize_step_ratio(max_step_ratio),
        }
    }

    /// WL camera: 120 ms ceiling keeps the stream above ~8 FPS.
    pub fn white_light() -> Self {
        Self::new(60_000, ExposureBounds::new(100, 120_000), DEFAULT_MAX_STEP_RATIO)
    }

    /// NIR camera: signal-starved, allowed to integrate much longer.
    pub fn near_infrared() -> Self {
        Self::new(500_000, ExposureBounds::new(100, 550_000), DEFAULT_MAX_STEP_RATIO)
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn bounds(&self) -> ExposureBounds {
        self.bounds
    }

    pub fn max_step_ratio(&self) -> f64 {
        self.max_step_ratio
    }

    pub fn with_current(mut self, current: u32) -> Self {
        self.current = self.bounds.clamp(current);
        self
    }

    /// Limits a raw multiplier to `1 ± max_step_ratio`.
    pub fn clamp_multiplier(&self, multiplier: f64) -> f64 {
        let low = 1.0 - self.max_step_ratio;
        let high = 1.0 + self.max_step_ratio;
        if multiplier.is_nan() {
            return 1.0;
        }
        multiplier.clamp(low, high)
    }

    /// Scales the exposure by an already clamped multiplier and stores the
    /// rounded, bounded result.
    pub fn apply_multiplier(&mut self, multiplier: f64) -> u32 {
        let scaled = (self.current as f64 * multiplier).round();
        let scaled = scaled.clamp(0.0, u32::MAX as f64) as u32;
        self.current = self.bounds.clamp(scaled);
        self.current
    }

    /// Stores a manually chosen exposure, clamped into bounds.
    pub fn set(&mut self, value: u32) -> u32 {
        self.current = self.bounds.clamp(value);
        self.current
    }
}

/// Control loop parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureParams {
    /// Target percentile cutoff on the 0..4095 scale
    pub target_cutoff: f64,
    /// Fraction of valid pixels below the measured cutoff
    pub percentile: f64,
    pub white_light: ExposureState,
    pub near_infrared: ExposureState,
}

impl Default for ExposureParams {
    fn default() -> Self {
        Self {
            target_cutoff: DEFAULT_TARGET_CUTOFF,
            percentile: DEFAULT_PERCENTILE,
            white_light: ExposureState::white_light(),
            near_infrared: ExposureState::near_infrared(),
        }
    }
}
