use serde::{Deserialize, Serialize};
use std::fmt;

/// Dolby Vision profiles that can be requested on the command line.
///
/// Identifiers arrive as strings (`"5"` is the CLI default) and are normalized
/// here, at the parsing boundary, via [`DvProfile::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DvProfile {
    /// Dual-layer, SDR-compatible base layer
    Profile4,
    /// Single-layer, IPTPQc2 base layer (not HDR10-compatible)
    Profile5,
    /// Single-layer, HDR10-compatible base layer (8.1)
    Profile8,
}

impl DvProfile {
    pub const ALL: [DvProfile; 3] = [DvProfile::Profile4, DvProfile::Profile5, DvProfile::Profile8];

    /// Resolve a profile identifier. Returns `None` for anything outside the
    /// supported set; callers decide how to report that.
    pub fn lookup(id: &str) -> Option<Self> {
        id.trim().parse::<u8>().ok().and_then(Self::from_id)
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            4 => Some(DvProfile::Profile4),
            5 => Some(DvProfile::Profile5),
            8 => Some(DvProfile::Profile8),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            DvProfile::Profile4 => 4,
            DvProfile::Profile5 => 5,
            DvProfile::Profile8 => 8,
        }
    }

    /// Value for libx265's `dolby-vision-profile` option.
    ///
    /// libx265 only signals single-layer profiles, so profile 4 has none.
    pub fn x265_value(self) -> Option<&'static str> {
        match self {
            DvProfile::Profile4 => None,
            DvProfile::Profile5 => Some("5"),
            DvProfile::Profile8 => Some("8.1"),
        }
    }
}

impl fmt::Display for DvProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
