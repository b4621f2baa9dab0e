//! Types for debayering operations

use bayer::CFA;

/// Color filter array layout of the sensor's top-left 2x2 tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BayerPattern {
    #[default]
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl BayerPattern {
    pub(crate) fn cfa(self) -> CFA {
        match self {
            BayerPattern::Rggb => CFA::RGGB,
            BayerPattern::Bggr => CFA::BGGR,
            BayerPattern::Grbg => CFA::GRBG,
            BayerPattern::Gbrg => CFA::GBRG,
        }
    }
}

/// Demosaic settings for the WL channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebayerConfig {
    pub pattern: BayerPattern,
    /// Undo the left-right flip introduced by the beam splitter
    pub mirror_horizontal: bool,
}

impl Default for DebayerConfig {
    fn default() -> Self {
        Self {
            pattern: BayerPattern::Rggb,
            mirror_horizontal: true,
        }
    }
}
