//! Security classification from authentication/key-management suite codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw authentication suite code as reported by a scan provider.
///
/// Providers translate their native representation into these codes. Any
/// value outside the named constants is still a valid code and classifies as
/// [`SecurityLabel::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AkmCode(pub u32);

impl AkmCode {
    pub const NONE: AkmCode = AkmCode(0);
    pub const WPA: AkmCode = AkmCode(1);
    pub const WPA_PSK: AkmCode = AkmCode(2);
    pub const WPA2: AkmCode = AkmCode(3);
    pub const WPA2_PSK: AkmCode = AkmCode(4);
    pub const UNKNOWN: AkmCode = AkmCode(5);
}

/// Human security label shown next to a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityLabel {
    Open,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WPA-PSK")]
    WpaPsk,
    #[serde(rename = "WPA2")]
    Wpa2,
    #[serde(rename = "WPA2-PSK")]
    Wpa2Psk,
    Unknown,
    Other,
}

impl SecurityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wpa => "WPA",
            Self::WpaPsk => "WPA-PSK",
            Self::Wpa2 => "WPA2",
            Self::Wpa2Psk => "WPA2-PSK",
            Self::Unknown => "Unknown",
            Self::Other => "Other",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for SecurityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a network by a single authentication suite.
///
/// `None` means the access point advertised no suites at all, which is an
/// open network.
pub fn classify(akm: Option<AkmCode>) -> SecurityLabel {
    let Some(code) = akm else {
        return SecurityLabel::Open;
    };

    match code {
        AkmCode::NONE => SecurityLabel::Open,
        AkmCode::WPA => SecurityLabel::Wpa,
        AkmCode::WPA_PSK => SecurityLabel::WpaPsk,
        AkmCode::WPA2 => SecurityLabel::Wpa2,
        AkmCode::WPA2_PSK => SecurityLabel::Wpa2Psk,
        AkmCode::UNKNOWN => SecurityLabel::Unknown,
        _ => SecurityLabel::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_suite_is_open() {
        assert_eq!(classify(None), SecurityLabel::Open);
    }

    #[test]
    fn test_recognized_codes() {
        let cases = [
            (AkmCode::NONE, "Open"),
            (AkmCode::WPA, "WPA"),
            (AkmCode::WPA_PSK, "WPA-PSK"),
            (AkmCode::WPA2, "WPA2"),
            (AkmCode::WPA2_PSK, "WPA2-PSK"),
            (AkmCode::UNKNOWN, "Unknown"),
        ];

        for (code, label) in cases {
            assert_eq!(classify(Some(code)).to_string(), label);
        }
    }

    #[test]
    fn test_unrecognized_codes_are_other() {
        for raw in [6, 8, 42, u32::MAX] {
            assert_eq!(classify(Some(AkmCode(raw))), SecurityLabel::Other);
        }
    }

    #[test]
    fn test_label_serializes_as_display_text() {
        let json = serde_json::to_string(&SecurityLabel::Wpa2Psk).unwrap();
        assert_eq!(json, "\"WPA2-PSK\"");
        assert!(SecurityLabel::Open.is_open());
        assert!(!SecurityLabel::Unknown.is_open());
    }
}
