//! Signal strength grading

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete signal quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalTier {
    Unusable,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SignalTier {
    /// Number of filled bars a presenter should draw (1-5)
    pub fn bars(&self) -> u8 {
        match self {
            Self::Excellent => 5,
            Self::Good => 4,
            Self::Fair => 3,
            Self::Poor => 2,
            Self::Unusable => 1,
        }
    }

    /// Colored square glyphs, as shown next to the dBm value in table views
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Excellent => "🟩🟩🟩🟩🟩",
            Self::Good => "🟩🟩🟩🟩",
            Self::Fair => "🟨🟨🟨",
            Self::Poor => "🟥🟥",
            Self::Unusable => "⬛",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Unusable => "Unusable",
        }
    }
}

impl fmt::Display for SignalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grade a signal strength in dBm. Thresholds are inclusive lower bounds.
pub fn grade(dbm: i32) -> SignalTier {
    match dbm {
        d if d >= -50 => SignalTier::Excellent,
        d if d >= -60 => SignalTier::Good,
        d if d >= -70 => SignalTier::Fair,
        d if d >= -80 => SignalTier::Poor,
        _ => SignalTier::Unusable,
    }
}
