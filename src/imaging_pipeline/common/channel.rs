//! Channel identifiers and the one-or-two channel container.

use std::fmt;

/// Imaging channel of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Visible (white-light) camera.
    WhiteLight,
    /// Near-infrared camera.
    NearInfrared,
}

impl ChannelKind {
    pub fn label(self) -> &'static str {
        match self {
            ChannelKind::WhiteLight => "WL",
            ChannelKind::NearInfrared => "NIR",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per connected camera.
///
/// A rig runs either both cameras jointly or a single camera of either
/// kind; components that handle both shapes are written once against this
/// type instead of duplicating the single-camera paths.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSet<T> {
    Joint { white_light: T, near_infrared: T },
    WhiteLight(T),
    NearInfrared(T),
}

impl<T> ChannelSet<T> {
    /// Builds a set from whichever channels are present.
    pub fn from_options(white_light: Option<T>, near_infrared: Option<T>) -> Option<Self> {
        match (white_light, near_infrared) {
            (Some(white_light), Some(near_infrared)) => Some(ChannelSet::Joint {
                white_light,
                near_infrared,
            }),
            (Some(wl), None) => Some(ChannelSet::WhiteLight(wl)),
            (None, Some(nir)) => Some(ChannelSet::NearInfrared(nir)),
            (None, None) => None,
        }
    }

    pub fn is_joint(&self) -> bool {
        matches!(self, ChannelSet::Joint { .. })
    }

    pub fn contains(&self, kind: ChannelKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&T> {
        match (self, kind) {
            (ChannelSet::Joint { white_light, .. }, ChannelKind::WhiteLight) => Some(white_light),
            (ChannelSet::Joint { near_infrared, .. }, ChannelKind::NearInfrared) => {
                Some(near_infrared)
            }
            (ChannelSet::WhiteLight(wl), ChannelKind::WhiteLight) => Some(wl),
            (ChannelSet::NearInfrared(nir), ChannelKind::NearInfrared) => Some(nir),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, kind: ChannelKind) -> Option<&mut T> {
        match (self, kind) {
            (ChannelSet::Joint { white_light, .. }, ChannelKind::WhiteLight) => Some(white_light),
            (ChannelSet::Joint { near_infrared, .. }, ChannelKind::NearInfrared) => {
                Some(near_infrared)
            }
            (ChannelSet::WhiteLight(wl), ChannelKind::WhiteLight) => Some(wl),
            (ChannelSet::NearInfrared(nir), ChannelKind::NearInfrared) => Some(nir),
            _ => None,
        }
    }

    /// Channels in the set, white light first.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelKind, &T)> {
        let entries: Vec<(ChannelKind, &T)> = match self {
            ChannelSet::Joint {
                white_light,
                near_infrared,
            } => vec![
                (ChannelKind::WhiteLight, white_light),
                (ChannelKind::NearInfrared, near_infrared),
            ],
            ChannelSet::WhiteLight(wl) => vec![(ChannelKind::WhiteLight, wl)],
            ChannelSet::NearInfrared(nir) => vec![(ChannelKind::NearInfrared, nir)],
        };
        entries.into_iter()
    }

    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.iter().map(|(kind, _)| kind).collect()
    }

    pub fn as_ref(&self) -> ChannelSet<&T> {
        match self {
            ChannelSet::Joint {
                white_light,
                near_infrared,
            } => ChannelSet::Joint {
                white_light,
                near_infrared,
            },
            ChannelSet::WhiteLight(wl) => ChannelSet::WhiteLight(wl),
            ChannelSet::NearInfrared(nir) => ChannelSet::NearInfrared(nir),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(ChannelKind, T) -> U) -> ChannelSet<U> {
        match self {
            ChannelSet::Joint {
                white_light,
                near_infrared,
            } => ChannelSet::Joint {
                white_light: f(ChannelKind::WhiteLight, white_light),
                near_infrared: f(ChannelKind::NearInfrared, near_infrared),
            },
            ChannelSet::WhiteLight(wl) => ChannelSet::WhiteLight(f(ChannelKind::WhiteLight, wl)),
            ChannelSet::NearInfrared(nir) => {
                ChannelSet::NearInfrared(f(ChannelKind::NearInfrared, nir))
            }
        }
    }
}
