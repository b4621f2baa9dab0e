//! Median filter configuration types

/// What happens to pixels closer than `radius` to an edge, where the
/// window does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderPolicy {
    /// Leave border pixels as captured (default)
    #[default]
    Preserve,
    /// Write zero into border pixels
    Zero,
    /// Pad with replicated edge samples so every pixel is filtered
    Replicate,
}

/// Configuration for the rolling median filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianFilterConfig {
    /// Whether NIR frames are filtered at all
    pub enabled: bool,
    /// Window half-width; the window side is `2 * radius + 1`
    pub radius: usize,
    pub border: BorderPolicy,
}

impl Default for MedianFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 1,
            border: BorderPolicy::Preserve,
        }
    }
}

impl MedianFilterConfig {
    pub fn window_side(&self) -> usize {
        2 * self.radius + 1
    }

    /// Zero-based rank of the median inside a full window.
    pub fn middle_element(&self) -> usize {
        (self.window_side() * self.window_side()) / 2
    }
}
