//! Raw scan observations and the normalized records built from them

use super::security::{classify, AkmCode, SecurityLabel};
use super::signal::{grade, SignalTier};
use serde::{Deserialize, Serialize};

/// Display name used for networks that withhold their SSID
pub const HIDDEN_SSID: &str = "<Hidden>";

/// Signal assumed when a provider could not read one. Grades as Unusable.
pub const MISSING_SIGNAL_DBM: i32 = -100;

/// One access point as reported by a provider, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// SSID bytes; empty for hidden networks
    pub ssid: Vec<u8>,
    pub signal_dbm: Option<i32>,
    /// Advertised authentication suites, in provider order
    pub akm: Vec<AkmCode>,
}

impl RawObservation {
    pub fn new(ssid: impl Into<Vec<u8>>, signal_dbm: i32, akm: Vec<AkmCode>) -> Self {
        Self {
            ssid: ssid.into(),
            signal_dbm: Some(signal_dbm),
            akm,
        }
    }
}

/// A normalized, display-ready network entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    ssid: String,
    signal_dbm: i32,
    signal_tier: SignalTier,
    security: SecurityLabel,
    is_open_warning: bool,
    display_index: usize,
}

impl NetworkRecord {
    fn from_observation(index: usize, observation: &RawObservation) -> Self {
        let signal_dbm = observation.signal_dbm.unwrap_or(MISSING_SIGNAL_DBM);
        let security = classify(observation.akm.first().copied());

        Self {
            ssid: display_ssid(&observation.ssid),
            signal_dbm,
            signal_tier: grade(signal_dbm),
            security,
            is_open_warning: security.is_open(),
            display_index: index,
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn signal_dbm(&self) -> i32 {
        self.signal_dbm
    }

    pub fn signal_tier(&self) -> SignalTier {
        self.signal_tier
    }

    pub fn security(&self) -> SecurityLabel {
        self.security
    }

    pub fn is_open_warning(&self) -> bool {
        self.is_open_warning
    }

    /// Row position, only meaningful for alternating row styles
    pub fn display_index(&self) -> usize {
        self.display_index
    }

    pub fn is_even_row(&self) -> bool {
        self.display_index % 2 == 0
    }

    /// `"-45 dBm"`
    pub fn signal_display(&self) -> String {
        format!("{} dBm", self.signal_dbm)
    }
}

fn display_ssid(raw: &[u8]) -> String {
    if raw.iter().all(|b| *b == 0) {
        return HIDDEN_SSID.to_string();
    }
    String::from_utf8_lossy(raw).into_owned()
}

/// Build one record per observation, keeping provider order.
pub fn normalize(observations: &[RawObservation]) -> Vec<NetworkRecord> {
    observations
        .iter()
        .enumerate()
        .map(|(i, observation)| NetworkRecord::from_observation(i, observation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campus_and_hidden_networks() {
        let observations = vec![
            RawObservation::new("CU_WiFi", -45, vec![AkmCode::WPA2_PSK]),
            RawObservation::new("", -80, vec![]),
        ];

        let records = normalize(&observations);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].ssid(), "CU_WiFi");
        assert_eq!(records[0].signal_tier(), SignalTier::Excellent);
        assert_eq!(records[0].security().to_string(), "WPA2-PSK");
        assert!(!records[0].is_open_warning());

        assert_eq!(records[1].ssid(), "<Hidden>");
        assert_eq!(records[1].signal_tier(), SignalTier::Poor);
        assert_eq!(records[1].security(), SecurityLabel::Open);
        assert!(records[1].is_open_warning());
    }

    #[test]
    fn test_order_and_length_are_preserved() {
        let observations: Vec<_> = (0..7)
            .map(|i| RawObservation::new(format!("net-{}", i), -40 - i * 7, vec![AkmCode::WPA]))
            .collect();

        let records = normalize(&observations);
        assert_eq!(records.len(), observations.len());
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.ssid(), format!("net-{}", i));
            assert_eq!(record.display_index(), i);
            assert_eq!(record.signal_dbm(), observations[i].signal_dbm.unwrap());
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let observations = vec![
            RawObservation::new("Office", -55, vec![AkmCode::WPA2]),
            RawObservation::new("Office", -72, vec![AkmCode::WPA2]),
        ];
        assert_eq!(normalize(&observations).len(), 2);
    }

    #[test]
    fn test_only_first_suite_counts() {
        let observation = RawObservation::new("Mixed", -60, vec![AkmCode::WPA, AkmCode::WPA2_PSK]);
        let records = normalize(&[observation]);
        assert_eq!(records[0].security(), SecurityLabel::Wpa);
    }

    #[test]
    fn test_malformed_fields_are_coerced() {
        let observation = RawObservation {
            ssid: vec![0, 0, 0, 0],
            signal_dbm: None,
            akm: vec![AkmCode(99)],
        };

        let record = &normalize(&[observation])[0];
        assert_eq!(record.ssid(), HIDDEN_SSID);
        assert_eq!(record.signal_dbm(), MISSING_SIGNAL_DBM);
        assert_eq!(record.signal_tier(), SignalTier::Unusable);
        assert_eq!(record.security(), SecurityLabel::Other);
        assert!(!record.is_open_warning());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let observation = RawObservation::new(vec![b'C', b'a', 0xff, b'e'], -65, vec![]);
        let record = &normalize(&[observation])[0];
        assert_eq!(record.ssid(), "Ca\u{fffd}e");
        assert_eq!(record.signal_display(), "-65 dBm");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).is_empty());
    }
}
